use crate::model::{Declaration, DepNode, GitRef, PkgRef, Revision, SourceKind, SourceRef};

/// Constraint recorded for git dependencies declared without a version.
pub const ANY_VERSION: &str = ".*";
/// Branch used for git dependencies declared without a version.
pub const DEFAULT_BRANCH: &str = "master";
/// Version given to registry dependencies declared without one.
pub const DEFAULT_PKG_VSN: &str = "0.0.0";

/// Repository URL synthesized for a fixture dependency.
pub fn fixture_repo_url(name: &str) -> String {
    format!("https://example.org/user/{name}.git")
}

/// Binds every declaration in `decls` (recursively) to a `kind` source.
///
/// The input is not modified and the output keeps declaration order. There
/// is no deduplication; a name declared twice yields two nodes.
pub fn expand(kind: SourceKind, decls: &[Declaration]) -> Vec<DepNode> {
    decls
        .iter()
        .map(|decl| DepNode {
            source: bind(kind, decl),
            deps: expand(kind, &decl.deps),
        })
        .collect()
}

fn bind(kind: SourceKind, decl: &Declaration) -> SourceRef {
    match (kind, &decl.version) {
        (SourceKind::Git, None) => SourceRef::Git(GitRef {
            name: decl.name.clone(),
            constraint: ANY_VERSION.to_string(),
            url: fixture_repo_url(&decl.name),
            revision: Revision::Literal(DEFAULT_BRANCH.to_string()),
        }),
        (SourceKind::Git, Some(vsn)) => SourceRef::Git(GitRef {
            name: decl.name.clone(),
            constraint: vsn.clone(),
            url: fixture_repo_url(&decl.name),
            revision: Revision::Tag(vsn.clone()),
        }),
        (SourceKind::Pkg, vsn) => SourceRef::Pkg(PkgRef {
            name: decl.name.clone(),
            version: vsn.clone().unwrap_or_else(|| DEFAULT_PKG_VSN.to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_expands_to_nothing() {
        assert!(expand(SourceKind::Git, &[]).is_empty());
        assert!(expand(SourceKind::Pkg, &[]).is_empty());
    }

    #[test]
    fn children_keep_the_parent_kind() {
        let decls = vec![Declaration::new("a", vec![Declaration::versioned("b", "2.0.0", vec![])])];
        let tree = expand(SourceKind::Pkg, &decls);
        assert_eq!(tree[0].deps[0].source.kind(), SourceKind::Pkg);
        assert_eq!(tree[0].deps[0].source.name(), "b");
    }
}
