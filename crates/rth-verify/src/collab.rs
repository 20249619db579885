//! Collaborator seams: app discovery, lock file reading and release assembly.
//!
//! The verifier only talks to these traits. Filesystem implementations live
//! in [`crate::discovery`], [`crate::lock`] and [`crate::release`].

use std::path::{Path, PathBuf};

use rth_core::errors::{ErrorInfo, HarnessError};
use rth_core::Term;
use rth_deps::Revision;
use serde::{Deserialize, Serialize};

use crate::expectation::AppFilter;

/// One discovered application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRecord {
    pub name: String,
    /// `vsn` exactly as written in the app resource.
    pub original_vsn: String,
    pub dir: PathBuf,
    /// Runtime applications listed in the resource.
    pub applications: Vec<String>,
    pub valid: bool,
}

/// Maps a set of directories to the apps found in them.
pub trait AppDiscovery {
    fn find_apps(&self, dirs: &[PathBuf], filter: AppFilter) -> Result<Vec<AppRecord>, HarnessError>;
}

/// Source descriptor of a lock entry.
#[derive(Debug, Clone, PartialEq)]
pub enum LockSource {
    /// `{pkg, Name, Vsn}` (optionally followed by a checksum).
    Pkg { name: String, version: String },
    /// `{git, Url, Revision}`
    Git { url: String, revision: Revision },
    /// Any other source shape, kept verbatim.
    Other(Term),
}

/// One `{Name, Source, Level}` entry of a lock file.
#[derive(Debug, Clone, PartialEq)]
pub struct LockEntry {
    pub name: String,
    pub source: LockSource,
    pub level: i64,
}

impl LockEntry {
    /// Version pinned by this entry.
    ///
    /// Registry entries pin their version; git entries pin the `{ref, Sha}`
    /// revision. Other shapes cannot be compared against a version.
    pub fn locked_version(&self) -> Result<&str, HarnessError> {
        match &self.source {
            LockSource::Pkg { version, .. } => Ok(version),
            LockSource::Git {
                revision: Revision::Ref(sha),
                ..
            } => Ok(sha),
            LockSource::Git { revision, .. } => Err(HarnessError::Contract(
                ErrorInfo::new(
                    "unsupported_lock_source",
                    format!("lock entry `{}` is not pinned to a ref", self.name),
                )
                .with_context("name", self.name.clone())
                .with_context("revision", format!("{revision:?}")),
            )),
            LockSource::Other(term) => Err(HarnessError::Contract(
                ErrorInfo::new(
                    "unsupported_lock_source",
                    format!("lock entry `{}` has an unsupported source", self.name),
                )
                .with_context("name", self.name.clone())
                .with_context("source", term.to_string()),
            )),
        }
    }
}

/// Reads a lock file into its flattened entries.
pub trait LockReader {
    fn read_lock(&self, path: &Path) -> Result<Vec<LockEntry>, HarnessError>;
}

/// Application pinned by a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseApp {
    pub name: String,
    pub version: String,
}

/// A release as recorded by its `.rel` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub name: String,
    pub version: String,
    pub erts: Option<String>,
    pub apps: Vec<ReleaseApp>,
}

/// Discovered release output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseView {
    apps: Vec<AppRecord>,
    releases: Vec<Release>,
}

impl ReleaseView {
    pub fn new(apps: Vec<AppRecord>, releases: Vec<Release>) -> Self {
        Self { apps, releases }
    }

    /// Apps realized under the releases' `lib` directories.
    pub fn apps(&self) -> &[AppRecord] {
        &self.apps
    }

    pub fn releases(&self) -> &[Release] {
        &self.releases
    }

    /// Looks up the release `name` at `version`.
    pub fn realized_release(&self, name: &str, version: &str) -> Result<&Release, HarnessError> {
        self.releases
            .iter()
            .find(|rel| rel.name == name && rel.version == version)
            .ok_or_else(|| {
                HarnessError::NotFound(
                    ErrorInfo::new(
                        "release_not_found",
                        format!("release `{name}` at version {version} was not found"),
                    )
                    .with_context("name", name)
                    .with_context("version", version),
                )
            })
    }
}

/// Builds a [`ReleaseView`] from a release output directory.
pub trait ReleaseAssembler {
    fn assemble(&self, release_dir: &Path) -> Result<ReleaseView, HarnessError>;
}
