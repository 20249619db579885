use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rth_core::errors::{ErrorInfo, HarnessError};
use tracing::{debug, info};

use crate::collab::{AppDiscovery, AppRecord, LockEntry, LockReader, ReleaseAssembler};
use crate::config::HarnessConfig;
use crate::cwd::CwdGuard;
use crate::discovery::{wildcard, FsAppDiscovery};
use crate::expectation::{AppFilter, Expectation};
use crate::lock::TermLockReader;
use crate::release::{is_dev_mode, FsReleaseAssembler};

type AppIndex = BTreeMap<String, AppRecord>;

// first occurrence of a name wins, matching profile directory order
fn index(apps: Vec<AppRecord>) -> AppIndex {
    let mut map = AppIndex::new();
    for app in apps {
        map.entry(app.name.clone()).or_insert(app);
    }
    map
}

fn lookup<'a>(table: &'a AppIndex, code: &str, name: &str) -> Result<&'a AppRecord, HarnessError> {
    table.get(name).ok_or_else(|| HarnessError::not_found(code, name))
}

fn check_version(name: &str, expected: &str, actual: &str) -> Result<(), HarnessError> {
    if expected == actual {
        Ok(())
    } else {
        Err(HarnessError::mismatch("version_mismatch", name, expected, actual))
    }
}

/// Build state discovered once per verification run.
#[derive(Debug, Default)]
struct World {
    all: AppIndex,
    valid: AppIndex,
    invalid: AppIndex,
    checkouts: AppIndex,
    plugins: AppIndex,
    locks: Vec<LockEntry>,
}

impl World {
    fn apps(&self, filter: AppFilter) -> &AppIndex {
        match filter {
            AppFilter::All => &self.all,
            AppFilter::Valid => &self.valid,
            AppFilter::Invalid => &self.invalid,
        }
    }
}

/// Checks expectations against the build output under a project root.
///
/// Holds no state between runs: every call to [`Verifier::verify`]
/// rediscovers apps, checkouts, plugins and lock entries from disk.
#[derive(Debug, Clone)]
pub struct Verifier<D = FsAppDiscovery, L = TermLockReader, R = FsReleaseAssembler> {
    config: HarnessConfig,
    discovery: D,
    locks: L,
    releases: R,
}

impl Verifier {
    /// Verifier backed by the filesystem collaborators and the default layout.
    pub fn new() -> Self {
        Self::with_collaborators(
            HarnessConfig::default(),
            FsAppDiscovery::new(),
            TermLockReader::new(),
            FsReleaseAssembler::new(),
        )
    }
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new()
    }
}

impl<D, L, R> Verifier<D, L, R>
where
    D: AppDiscovery,
    L: LockReader,
    R: ReleaseAssembler,
{
    pub fn with_collaborators(config: HarnessConfig, discovery: D, locks: L, releases: R) -> Self {
        Self {
            config,
            discovery,
            locks,
            releases,
        }
    }

    /// Replaces the layout configuration.
    pub fn with_config(mut self, config: HarnessConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Evaluates `expectations` in order and stops at the first failure.
    ///
    /// A relative `root` is resolved against the current directory once, before
    /// any check runs.
    pub fn verify(&self, root: &Path, expectations: &[Expectation]) -> Result<(), HarnessError> {
        let root = std::path::absolute(root)
            .map_err(|err| HarnessError::io("root_resolve", root, err))?;
        let world = self.discover(&root)?;
        for expectation in expectations {
            debug!(%expectation, "checking expectation");
            self.check(&root, &world, expectation)?;
        }
        Ok(())
    }

    fn discover(&self, root: &Path) -> Result<World, HarnessError> {
        let build = root.join(&self.config.build_dir);
        let lib_dirs = wildcard(&build, "*/lib")?;
        let plugin_dirs = wildcard(&build, "*/plugins")?;
        let checkout_dirs = vec![root.join(&self.config.checkouts_dir)];

        let world = World {
            all: index(self.discovery.find_apps(&lib_dirs, AppFilter::All)?),
            valid: index(self.discovery.find_apps(&lib_dirs, AppFilter::Valid)?),
            invalid: index(self.discovery.find_apps(&lib_dirs, AppFilter::Invalid)?),
            checkouts: index(self.discovery.find_apps(&checkout_dirs, AppFilter::All)?),
            plugins: index(self.discovery.find_apps(&plugin_dirs, AppFilter::All)?),
            locks: self.locks.read_lock(&root.join(&self.config.lock_file))?,
        };
        info!(
            root = %root.display(),
            apps = world.all.len(),
            invalid = world.invalid.len(),
            checkouts = world.checkouts.len(),
            plugins = world.plugins.len(),
            locks = world.locks.len(),
            "discovered build state"
        );
        Ok(world)
    }

    fn check(&self, root: &Path, world: &World, expectation: &Expectation) -> Result<(), HarnessError> {
        match expectation {
            Expectation::App { name, filter } => {
                lookup(world.apps(*filter), "app_not_found", name).map(drop)
            }
            Expectation::Checkout { name } => {
                lookup(&world.checkouts, "checkout_not_found", name).map(drop)
            }
            Expectation::Dep { name, version } => {
                let app = lookup(&world.all, "dep_not_found", name)?;
                match version {
                    Some(expected) => check_version(name, expected, &app.original_vsn),
                    None => Ok(()),
                }
            }
            Expectation::Plugin { name, version } => {
                let plugin = lookup(&world.plugins, "plugin_not_found", name)?;
                match version {
                    Some(expected) => check_version(name, expected, &plugin.original_vsn),
                    None => Ok(()),
                }
            }
            Expectation::Lock { name, version } => {
                let entry = world
                    .locks
                    .iter()
                    .find(|entry| entry.name == *name)
                    .ok_or_else(|| HarnessError::not_found("lock_not_found", name))?;
                match version {
                    Some(expected) => check_version(name, expected, entry.locked_version()?),
                    None => Ok(()),
                }
            }
            Expectation::Release {
                name,
                version,
                dev_mode,
            } => self.check_release(root, name, version, *dev_mode),
            Expectation::Tar { name, version } => {
                let tarball = self.tarball_path(root, name, version);
                if tarball.is_file() {
                    Ok(())
                } else {
                    Err(HarnessError::NotFound(
                        ErrorInfo::new("tar_not_found", format!("no tarball for {name}-{version}"))
                            .with_context("name", name.clone())
                            .with_path(&tarball),
                    ))
                }
            }
            Expectation::File { path } => {
                let resolved = root.join(path);
                if resolved.is_file() {
                    Ok(())
                } else {
                    Err(HarnessError::NotFound(
                        ErrorInfo::new("file_not_found", "expected a regular file").with_path(&resolved),
                    ))
                }
            }
        }
    }

    /// `<root>/<tarball_dir>/<name>/<name>-<version>.tar.gz`
    pub fn tarball_path(&self, root: &Path, name: &str, version: &str) -> PathBuf {
        root.join(&self.config.tarball_dir)
            .join(name)
            .join(format!("{name}-{version}.tar.gz"))
    }

    fn release_dir(&self, root: &Path) -> Result<PathBuf, HarnessError> {
        let build = root.join(&self.config.build_dir);
        let mut found = wildcard(&build, "*/rel")?;
        match found.len() {
            1 => Ok(found.remove(0)),
            0 => Err(HarnessError::NotFound(
                ErrorInfo::new("release_dir_not_found", "no release output directory")
                    .with_path(&build),
            )),
            n => Err(HarnessError::Contract(
                ErrorInfo::new(
                    "ambiguous_release_dir",
                    format!("expected one release output directory, found {n}"),
                )
                .with_path(&build),
            )),
        }
    }

    fn check_release(
        &self,
        root: &Path,
        name: &str,
        version: &str,
        expected_dev_mode: bool,
    ) -> Result<(), HarnessError> {
        let release_dir = self.release_dir(root)?;
        let _cwd = if self.config.release_requires_cwd {
            Some(CwdGuard::enter(root)?)
        } else {
            None
        };
        let lib_dir = release_dir.join(name).join("lib");
        if !lib_dir.is_dir() {
            return Err(HarnessError::NotFound(
                ErrorInfo::new(
                    "release_not_found",
                    format!("release `{name}` has no output under {}", release_dir.display()),
                )
                .with_context("name", name)
                .with_context("version", version)
                .with_path(&lib_dir),
            ));
        }
        let view = self.releases.assemble(&release_dir)?;
        let dev_mode = is_dev_mode(&lib_dir)?;
        debug!(name, version, dev_mode, apps = view.apps().len(), "inspected release");
        if dev_mode != expected_dev_mode {
            return Err(HarnessError::mismatch(
                "dev_mode_mismatch",
                name,
                &format!("dev_mode={expected_dev_mode}"),
                &format!("dev_mode={dev_mode}"),
            ));
        }
        view.realized_release(name, version).map(drop)
    }
}

/// Verifies `expectations` under `root` with the default filesystem collaborators.
pub fn verify(root: &Path, expectations: &[Expectation]) -> Result<(), HarnessError> {
    Verifier::new().verify(root, expectations)
}
