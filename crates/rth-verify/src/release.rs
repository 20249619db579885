use std::fs;
use std::path::Path;

use rth_core::errors::{ErrorInfo, HarnessError};
use rth_core::{consult_file, Term};
use tracing::debug;

use crate::collab::{AppDiscovery, Release, ReleaseApp, ReleaseAssembler, ReleaseView};
use crate::discovery::{wildcard, FsAppDiscovery};
use crate::expectation::AppFilter;

fn rel_error(path: &Path, message: impl Into<String>) -> HarnessError {
    HarnessError::Parse(ErrorInfo::new("rel_file", message).with_path(path))
}

fn pair(term: &Term) -> Option<(&str, &str)> {
    match term.as_tuple()? {
        [first, second, ..] => Some((first.as_text()?, second.as_text()?)),
        _ => None,
    }
}

/// Parses `{release, {Name, Vsn}, {erts, ErtsVsn}, [{App, AppVsn} | ...]}.`
pub fn read_rel_file(path: &Path) -> Result<Release, HarnessError> {
    let terms = consult_file(path)?;
    let items = terms
        .first()
        .and_then(Term::as_tuple)
        .ok_or_else(|| rel_error(path, "expected a release tuple"))?;
    let [tag, id, erts, apps] = items else {
        return Err(rel_error(path, "expected {release, Id, Erts, Apps}"));
    };
    if tag.as_atom() != Some("release") {
        return Err(rel_error(path, format!("unexpected tag {tag}")));
    }
    let (name, version) = pair(id).ok_or_else(|| rel_error(path, format!("bad release id {id}")))?;
    let erts = pair(erts).map(|(_, vsn)| vsn.to_string());
    let apps = apps
        .as_list()
        .ok_or_else(|| rel_error(path, "release apps must be a list"))?
        .iter()
        .map(|app| {
            pair(app)
                .map(|(name, version)| ReleaseApp {
                    name: name.to_string(),
                    version: version.to_string(),
                })
                .ok_or_else(|| rel_error(path, format!("bad release app {app}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Release {
        name: name.to_string(),
        version: version.to_string(),
        erts,
        apps,
    })
}

/// Whether every entry of a release `lib` directory is a symbolic link.
///
/// An empty directory counts as dev mode.
pub fn is_dev_mode(lib_dir: &Path) -> Result<bool, HarnessError> {
    let entries =
        fs::read_dir(lib_dir).map_err(|err| HarnessError::io("release_lib_read", lib_dir, err))?;
    for entry in entries {
        let entry = entry.map_err(|err| HarnessError::io("release_lib_read", lib_dir, err))?;
        let meta = fs::symlink_metadata(entry.path())
            .map_err(|err| HarnessError::io("release_lib_read", &entry.path(), err))?;
        if !meta.file_type().is_symlink() {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Filesystem release assembly over a `<profile>/rel` directory.
#[derive(Debug, Clone, Default)]
pub struct FsReleaseAssembler<D = FsAppDiscovery> {
    discovery: D,
}

impl FsReleaseAssembler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D: AppDiscovery> FsReleaseAssembler<D> {
    pub fn with_discovery(discovery: D) -> Self {
        Self { discovery }
    }
}

impl<D: AppDiscovery> ReleaseAssembler for FsReleaseAssembler<D> {
    fn assemble(&self, release_dir: &Path) -> Result<ReleaseView, HarnessError> {
        let lib_dirs = wildcard(release_dir, "*/lib")?;
        let apps = self.discovery.find_apps(&lib_dirs, AppFilter::All)?;
        let releases = wildcard(release_dir, "*/releases/*/*.rel")?
            .iter()
            .map(|path| read_rel_file(path))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            dir = %release_dir.display(),
            apps = apps.len(),
            releases = releases.len(),
            "assembled release view"
        );
        Ok(ReleaseView::new(apps, releases))
    }
}
