use rth_core::errors::{ErrorInfo, HarnessError};

use crate::model::{DepNode, FlatDep, SimpleDep, SourceKind, SourceRef};

fn wrong_source(expected: SourceKind, source: &SourceRef) -> HarnessError {
    HarnessError::Contract(
        ErrorInfo::new(
            "unsupported_source",
            format!("expected a {expected} reference, found a {} reference", source.kind()),
        )
        .with_context("name", source.name()),
    )
}

/// Canonical version of a git reference; a registry reference is rejected.
pub fn version_of(source: &SourceRef) -> Result<&str, HarnessError> {
    match source {
        SourceRef::Git(git) => Ok(git.version()),
        SourceRef::Pkg(_) => Err(wrong_source(SourceKind::Git, source)),
    }
}

/// Projects each immediate child to its own reference, dropping grandchildren.
///
/// Git children report their declared constraint, not the revision.
pub fn toplevel(children: &[DepNode]) -> Vec<SimpleDep> {
    children
        .iter()
        .map(|child| match &child.source {
            SourceRef::Pkg(pkg) => SimpleDep::Pkg {
                name: pkg.name.clone(),
                version: pkg.version.clone(),
            },
            SourceRef::Git(git) => SimpleDep::Git {
                name: git.name.clone(),
                version: git.constraint.clone(),
                reference: git.clone(),
            },
        })
        .collect()
}

/// Flattens a tree of the given kind.
pub fn flatten(kind: SourceKind, tree: &[DepNode]) -> Result<Vec<FlatDep>, HarnessError> {
    match kind {
        SourceKind::Git => flatten_git(tree),
        SourceKind::Pkg => flatten_pkg(tree),
    }
}

/// Flattens a git-bound tree, one record per node in pre-order.
pub fn flatten_git(tree: &[DepNode]) -> Result<Vec<FlatDep>, HarnessError> {
    let mut out = Vec::new();
    walk(tree, &mut out, &|source| {
        version_of(source).map(|vsn| (source.name().to_string(), vsn.to_string()))
    })?;
    Ok(out)
}

/// Flattens a registry-bound tree, one record per node in pre-order.
pub fn flatten_pkg(tree: &[DepNode]) -> Result<Vec<FlatDep>, HarnessError> {
    let mut out = Vec::new();
    walk(tree, &mut out, &|source| match source {
        SourceRef::Pkg(pkg) => Ok((pkg.name.clone(), pkg.version.clone())),
        SourceRef::Git(_) => Err(wrong_source(SourceKind::Pkg, source)),
    })?;
    Ok(out)
}

// self, then own subtree, then the remaining siblings
fn walk<F>(nodes: &[DepNode], out: &mut Vec<FlatDep>, identity: &F) -> Result<(), HarnessError>
where
    F: Fn(&SourceRef) -> Result<(String, String), HarnessError>,
{
    for node in nodes {
        let (name, version) = identity(&node.source)?;
        out.push(FlatDep {
            name,
            version,
            deps: toplevel(&node.deps),
        });
        walk(&node.deps, out, identity)?;
    }
    Ok(())
}
