use std::path::Path;

use rth_core::errors::{ErrorInfo, HarnessError};
use rth_core::{consult_file, Term};
use rth_deps::Revision;
use tracing::debug;

use crate::collab::{LockEntry, LockReader, LockSource};

fn lock_error(path: &Path, message: impl Into<String>) -> HarnessError {
    HarnessError::Parse(ErrorInfo::new("lock_entry", message).with_path(path))
}

fn revision(term: &Term) -> Option<Revision> {
    if let Some(literal) = term.as_text() {
        return Some(Revision::Literal(literal.to_string()));
    }
    match term.as_tuple()? {
        [kind, value] => {
            let value = value.as_text()?.to_string();
            match kind.as_atom()? {
                "tag" => Some(Revision::Tag(value)),
                "branch" => Some(Revision::Branch(value)),
                "ref" => Some(Revision::Ref(value)),
                _ => None,
            }
        }
        _ => None,
    }
}

fn source(term: &Term) -> LockSource {
    let parsed = match term.as_tuple() {
        Some([kind, name, version, ..]) if kind.as_atom() == Some("pkg") => {
            match (name.as_text(), version.as_text()) {
                (Some(name), Some(version)) => Some(LockSource::Pkg {
                    name: name.to_string(),
                    version: version.to_string(),
                }),
                _ => None,
            }
        }
        Some([kind, url, rev]) if kind.as_atom() == Some("git") => {
            match (url.as_text(), revision(rev)) {
                (Some(url), Some(revision)) => Some(LockSource::Git {
                    url: url.to_string(),
                    revision,
                }),
                _ => None,
            }
        }
        _ => None,
    };
    parsed.unwrap_or_else(|| LockSource::Other(term.clone()))
}

fn entry(path: &Path, term: &Term) -> Result<LockEntry, HarnessError> {
    match term.as_tuple() {
        Some([name, src, level]) => {
            let name = name
                .as_text()
                .ok_or_else(|| lock_error(path, format!("lock entry name is not text: {name}")))?;
            let level = match level {
                Term::Int(level) => *level,
                other => return Err(lock_error(path, format!("lock level is not an integer: {other}"))),
            };
            Ok(LockEntry {
                name: name.to_string(),
                source: source(src),
                level,
            })
        }
        _ => Err(lock_error(path, format!("expected {{Name, Source, Level}}, found {term}"))),
    }
}

/// Reads `rebar.lock` style files.
///
/// Accepts the legacy layout (one list of entries) and the versioned layout
/// (`{"1.2.0", [Entries]}.` followed by metadata terms, which are ignored).
/// A missing file reads as an empty lock.
#[derive(Debug, Clone, Default)]
pub struct TermLockReader;

impl TermLockReader {
    pub fn new() -> Self {
        Self
    }
}

impl LockReader for TermLockReader {
    fn read_lock(&self, path: &Path) -> Result<Vec<LockEntry>, HarnessError> {
        if !path.exists() {
            debug!(path = %path.display(), "no lock file");
            return Ok(Vec::new());
        }
        let terms = consult_file(path)?;
        let entries = match terms.first() {
            None => return Ok(Vec::new()),
            Some(Term::List(entries)) => entries.as_slice(),
            Some(Term::Tuple(items)) => match items.as_slice() {
                [version, Term::List(entries)] if version.as_text().is_some() => entries.as_slice(),
                _ => return Err(lock_error(path, "unrecognised lock file layout")),
            },
            Some(other) => return Err(lock_error(path, format!("unrecognised lock term {other}"))),
        };
        entries.iter().map(|term| entry(path, term)).collect()
    }
}
