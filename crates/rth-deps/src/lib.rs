//! Dependency tree fixtures.
//!
//! Test authors describe a dependency graph as a terse [`Declaration`] tree,
//! bind it to git or registry sources with [`expand`], and derive the flat
//! `(name, version)` records a build should end up with via [`flatten`].

mod expand;
mod flatten;
mod model;

pub use expand::{expand, fixture_repo_url, ANY_VERSION, DEFAULT_BRANCH, DEFAULT_PKG_VSN};
pub use flatten::{flatten, flatten_git, flatten_pkg, toplevel, version_of};
pub use model::{
    Declaration, DepNode, FlatDep, GitRef, PkgRef, Revision, SimpleDep, SourceKind, SourceRef,
};
