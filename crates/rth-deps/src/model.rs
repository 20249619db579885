use std::fmt;
use std::str::FromStr;

use rth_core::errors::{ErrorInfo, HarnessError};
use serde::{Deserialize, Serialize};

/// Source family a declaration tree is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Version-control addressed dependencies.
    Git,
    /// Registry addressed dependencies.
    Pkg,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Git => f.write_str("git"),
            SourceKind::Pkg => f.write_str("pkg"),
        }
    }
}

impl FromStr for SourceKind {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "git" => Ok(SourceKind::Git),
            "pkg" => Ok(SourceKind::Pkg),
            other => Err(HarnessError::Contract(
                ErrorInfo::new("unsupported_source_kind", format!("unknown source kind `{other}`"))
                    .with_hint("expected `git` or `pkg`"),
            )),
        }
    }
}

/// Author-facing dependency declaration.
///
/// `version: None` is the two-element form `(Name, Children)`; `Some` is the
/// three-element form `(Name, Version, Children)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    /// Dependency name.
    pub name: String,
    /// Pinned version, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Transitive dependencies of this one.
    #[serde(default)]
    pub deps: Vec<Declaration>,
}

impl Declaration {
    /// `(Name, Children)`
    pub fn new(name: impl Into<String>, deps: Vec<Declaration>) -> Self {
        Self {
            name: name.into(),
            version: None,
            deps,
        }
    }

    /// `(Name, Version, Children)`
    pub fn versioned(name: impl Into<String>, version: impl Into<String>, deps: Vec<Declaration>) -> Self {
        Self {
            name: name.into(),
            version: Some(version.into()),
            deps,
        }
    }

    /// Declaration without children and without a version.
    pub fn leaf(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    /// Number of declarations in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.deps.iter().map(Declaration::node_count).sum::<usize>()
    }
}

/// Revision component of a git source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Revision {
    /// Bare branch or commit literal, e.g. `"master"`.
    Literal(String),
    /// `{tag, Vsn}`
    Tag(String),
    /// `{branch, Name}`
    Branch(String),
    /// `{ref, Sha}`
    Ref(String),
}

impl Revision {
    /// The version string a revision pins: the pair's value, or the literal itself.
    pub fn version(&self) -> &str {
        match self {
            Revision::Literal(value)
            | Revision::Tag(value)
            | Revision::Branch(value)
            | Revision::Ref(value) => value,
        }
    }
}

/// Version-control source reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GitRef {
    pub name: String,
    /// Version constraint as written in the dependency list (`".*"` when unpinned).
    pub constraint: String,
    pub url: String,
    pub revision: Revision,
}

impl GitRef {
    /// Canonical version of the reference.
    pub fn version(&self) -> &str {
        self.revision.version()
    }
}

/// Registry source reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PkgRef {
    pub name: String,
    pub version: String,
}

/// A bound source for one dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum SourceRef {
    Git(GitRef),
    Pkg(PkgRef),
}

impl SourceRef {
    /// Dependency name regardless of source family.
    pub fn name(&self) -> &str {
        match self {
            SourceRef::Git(git) => &git.name,
            SourceRef::Pkg(pkg) => &pkg.name,
        }
    }

    /// Which family this reference belongs to.
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceRef::Git(_) => SourceKind::Git,
            SourceRef::Pkg(_) => SourceKind::Pkg,
        }
    }
}

/// Node of an expanded dependency tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepNode {
    pub source: SourceRef,
    #[serde(default)]
    pub deps: Vec<DepNode>,
}

impl DepNode {
    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.deps.iter().map(DepNode::node_count).sum::<usize>()
    }
}

/// Immediate child of a flat record, without its own children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum SimpleDep {
    /// `(Name, Version)`
    Pkg { name: String, version: String },
    /// `(Name, Constraint, Ref)`
    Git {
        name: String,
        version: String,
        reference: GitRef,
    },
}

impl SimpleDep {
    pub fn name(&self) -> &str {
        match self {
            SimpleDep::Pkg { name, .. } | SimpleDep::Git { name, .. } => name,
        }
    }

    pub fn version(&self) -> &str {
        match self {
            SimpleDep::Pkg { version, .. } | SimpleDep::Git { version, .. } => version,
        }
    }
}

/// One node's canonical identity plus its immediate children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlatDep {
    pub name: String,
    pub version: String,
    pub deps: Vec<SimpleDep>,
}

impl FlatDep {
    /// `(name, version)` pair, the form assertions usually compare against.
    pub fn key(&self) -> (&str, &str) {
        (&self.name, &self.version)
    }
}
