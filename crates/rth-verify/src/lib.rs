//! Declarative verification of build output.
//!
//! A [`Verifier`] discovers the apps, checkouts, plugins, lock entries and
//! releases a build left under a project root, then checks a list of
//! [`Expectation`]s against them in order.

pub mod build;
pub mod collab;
pub mod config;
pub mod cwd;
pub mod discovery;
pub mod expectation;
pub mod lock;
pub mod release;
pub mod verifier;

pub use build::{run_and_check, BuildTool, CommandError, CommandTool, Outcome};
pub use collab::{
    AppDiscovery, AppRecord, LockEntry, LockReader, LockSource, Release, ReleaseApp,
    ReleaseAssembler, ReleaseView,
};
pub use config::HarnessConfig;
pub use cwd::CwdGuard;
pub use discovery::FsAppDiscovery;
pub use expectation::{AppFilter, Expectation};
pub use lock::TermLockReader;
pub use release::{is_dev_mode, read_rel_file, FsReleaseAssembler};
pub use verifier::{verify, Verifier};
