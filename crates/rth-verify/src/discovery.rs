use std::fs;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use rth_core::errors::{ErrorInfo, HarnessError};
use rth_core::{consult_file, Term};
use tracing::debug;
use walkdir::WalkDir;

use crate::collab::{AppDiscovery, AppRecord};
use crate::expectation::AppFilter;

const COMPILED_RESOURCE: usize = 0;
const SOURCE_RESOURCE: usize = 1;

fn discovery_error(code: &str, message: impl std::fmt::Display) -> HarnessError {
    HarnessError::Contract(ErrorInfo::new(code, message.to_string()))
}

/// Expands `<base>/<tail>` where `tail` may contain wildcards; `base` is
/// matched literally. Results are sorted.
pub(crate) fn wildcard(base: &Path, tail: &str) -> Result<Vec<PathBuf>, HarnessError> {
    let base = base.to_str().ok_or_else(|| {
        discovery_error("non_utf8_path", format!("path {} is not valid UTF-8", base.display()))
    })?;
    let pattern = format!("{}/{}", glob::Pattern::escape(base), tail);
    let mut paths: Vec<PathBuf> = glob::glob(&pattern)
        .map_err(|err| discovery_error("bad_pattern", err))?
        .filter_map(Result::ok)
        .collect();
    paths.sort();
    Ok(paths)
}

fn resource_globset() -> Result<GlobSet, HarnessError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in ["ebin/*.app", "src/*.app.src"] {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|err| discovery_error("glob", err))?;
        builder.add(glob);
    }
    builder.build().map_err(|err| discovery_error("glob-build", err))
}

struct Resource {
    name: String,
    vsn: Option<String>,
    modules: Vec<String>,
    applications: Vec<String>,
}

fn atoms(list: Option<&Term>) -> Vec<String> {
    list.and_then(Term::as_list)
        .map(|items| items.iter().filter_map(Term::as_text).map(str::to_string).collect())
        .unwrap_or_default()
}

fn read_resource(path: &Path) -> Result<Resource, HarnessError> {
    let terms = consult_file(path)?;
    let malformed = || {
        HarnessError::Parse(
            ErrorInfo::new("app_resource", "expected {application, Name, Props}").with_path(path),
        )
    };
    let items = terms.first().and_then(Term::as_tuple).ok_or_else(malformed)?;
    let (name, props) = match items {
        [tag, name, props] if tag.as_atom() == Some("application") => {
            (name.as_text().ok_or_else(malformed)?, props)
        }
        _ => return Err(malformed()),
    };
    // non-string versions (`{cmd, ...}`, `git`) are kept in their printed form
    let vsn = props
        .proplist_get("vsn")
        .map(|vsn| vsn.as_text().map(str::to_string).unwrap_or_else(|| vsn.to_string()));
    Ok(Resource {
        name: name.to_string(),
        vsn,
        modules: atoms(props.proplist_get("modules")),
        applications: atoms(props.proplist_get("applications")),
    })
}

/// Filesystem app discovery.
///
/// Every input directory and each of its immediate sub-directories is a
/// candidate app. A candidate is an app when it holds `ebin/*.app` or
/// `src/*.app.src`; it is valid when the compiled resource exists, carries a
/// version, and every listed module has a `.beam` next to it.
#[derive(Debug, Clone, Default)]
pub struct FsAppDiscovery;

impl FsAppDiscovery {
    pub fn new() -> Self {
        Self
    }

    fn candidates(dir: &Path) -> Result<Vec<PathBuf>, HarnessError> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut out = vec![dir.to_path_buf()];
        let entries = fs::read_dir(dir).map_err(|err| HarnessError::io("discovery_read", dir, err))?;
        let mut children = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| HarnessError::io("discovery_read", dir, err))?;
            let path = entry.path();
            if path.is_dir() {
                children.push(path);
            }
        }
        children.sort();
        out.extend(children);
        Ok(out)
    }

    fn inspect(candidate: &Path, globset: &GlobSet) -> Result<Option<AppRecord>, HarnessError> {
        let mut compiled = None;
        let mut source = None;
        let walker = WalkDir::new(candidate)
            .min_depth(2)
            .max_depth(2)
            .sort_by_file_name();
        for entry in walker.into_iter().filter_map(Result::ok) {
            if !entry.path().is_file() {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(candidate) else {
                continue;
            };
            for idx in globset.matches(rel) {
                let slot = match idx {
                    COMPILED_RESOURCE => &mut compiled,
                    SOURCE_RESOURCE => &mut source,
                    _ => continue,
                };
                if slot.is_none() {
                    *slot = Some(entry.path().to_path_buf());
                }
            }
        }

        let Some(resource_path) = compiled.as_ref().or(source.as_ref()) else {
            return Ok(None);
        };
        let resource = read_resource(resource_path)?;
        let ebin = candidate.join("ebin");
        let valid = compiled.is_some()
            && resource.vsn.is_some()
            && resource
                .modules
                .iter()
                .all(|module| ebin.join(format!("{module}.beam")).is_file());
        debug!(
            name = %resource.name,
            dir = %candidate.display(),
            valid,
            "discovered app"
        );
        Ok(Some(AppRecord {
            name: resource.name,
            original_vsn: resource.vsn.unwrap_or_default(),
            dir: candidate.to_path_buf(),
            applications: resource.applications,
            valid,
        }))
    }
}

impl AppDiscovery for FsAppDiscovery {
    fn find_apps(&self, dirs: &[PathBuf], filter: AppFilter) -> Result<Vec<AppRecord>, HarnessError> {
        let globset = resource_globset()?;
        let mut apps = Vec::new();
        for dir in dirs {
            for candidate in Self::candidates(dir)? {
                if let Some(app) = Self::inspect(&candidate, &globset)? {
                    if filter.admits(app.valid) {
                        apps.push(app);
                    }
                }
            }
        }
        Ok(apps)
    }
}
