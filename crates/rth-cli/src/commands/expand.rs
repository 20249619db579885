use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use rth_deps::{expand, flatten, Declaration, SourceKind};
use serde_json::Value;
use tracing::debug;

#[derive(Args, Debug)]
pub struct ExpandArgs {
    /// Source family to bind the tree to (`git` or `pkg`).
    #[arg(long)]
    pub kind: SourceKind,
    /// JSON array of declarations.
    #[arg(long)]
    pub tree: PathBuf,
    /// Print the pre-order flattened records instead of the expanded tree.
    #[arg(long)]
    pub flat: bool,
}

pub(crate) fn render(kind: SourceKind, tree: &[Declaration], flat: bool) -> Result<Value, Box<dyn Error>> {
    let nodes = expand(kind, tree);
    debug!(%kind, roots = nodes.len(), "expanded declaration tree");
    if flat {
        Ok(serde_json::to_value(flatten(kind, &nodes)?)?)
    } else {
        Ok(serde_json::to_value(&nodes)?)
    }
}

fn load_tree(path: &Path) -> Result<Vec<Declaration>, Box<dyn Error>> {
    let text = fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    Ok(serde_json::from_str(&text)?)
}

pub fn run(args: &ExpandArgs) -> Result<(), Box<dyn Error>> {
    let tree = load_tree(&args.tree)?;
    let value = render(args.kind, &tree, args.flat)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
