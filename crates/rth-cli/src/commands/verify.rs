use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Args;
use rth_verify::{Expectation, HarnessConfig, Verifier};
use tracing::info;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Project root whose build output is inspected.
    #[arg(long)]
    pub root: PathBuf,
    /// JSON array of expectations.
    #[arg(long)]
    pub expect: PathBuf,
    /// Optional TOML layout configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Print failures as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

pub(crate) fn load_expectations(path: &Path) -> Result<Vec<Expectation>, Box<dyn Error>> {
    let text = fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    Ok(serde_json::from_str(&text)?)
}

pub fn run(args: &VerifyArgs) -> Result<ExitCode, Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => HarnessConfig::load(path)?,
        None => HarnessConfig::default(),
    };
    let expectations = load_expectations(&args.expect)?;
    info!(count = expectations.len(), root = %args.root.display(), "verifying");

    match Verifier::new().with_config(config).verify(&args.root, &expectations) {
        Ok(()) => {
            println!("ok");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) if args.json => {
            println!("{}", serde_json::to_string_pretty(&err)?);
            Ok(ExitCode::FAILURE)
        }
        Err(err) => {
            println!("failed: {err}");
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_expectation_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expect.json");
        fs::write(&path, r#"[{"kind": "lock", "name": "foo"}, {"kind": "checkout", "name": "bar"}]"#)
            .unwrap();
        let expectations = load_expectations(&path).unwrap();
        assert_eq!(expectations, vec![Expectation::lock("foo"), Expectation::checkout("bar")]);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expect.json");
        fs::write(&path, r#"[{"kind": "nonsense", "name": "foo"}]"#).unwrap();
        assert!(load_expectations(&path).is_err());
    }
}
