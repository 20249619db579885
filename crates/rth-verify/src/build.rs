use std::fmt::{Debug, Display};
use std::path::Path;
use std::process::Command;

use rth_core::errors::{ErrorInfo, HarnessError};
use thiserror::Error;
use tracing::{debug, info};

use crate::collab::{AppDiscovery, LockReader, ReleaseAssembler};
use crate::expectation::Expectation;
use crate::verifier::Verifier;

/// Something that can build a project in place.
pub trait BuildTool {
    type Error: Debug + Display + PartialEq;

    fn run(&mut self, root: &Path, args: &[String]) -> Result<(), Self::Error>;
}

/// What a build is expected to produce.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<E> {
    /// The build succeeds and these expectations then hold.
    Ok(Vec<Expectation>),
    /// The build fails with exactly this error.
    Error(E),
}

impl<D, L, R> Verifier<D, L, R>
where
    D: AppDiscovery,
    L: LockReader,
    R: ReleaseAssembler,
{
    /// Runs `tool` under `root` and checks the result against `outcome`.
    pub fn run_and_check<T: BuildTool>(
        &self,
        tool: &mut T,
        root: &Path,
        args: &[String],
        outcome: &Outcome<T::Error>,
    ) -> Result<(), HarnessError> {
        let result = tool.run(root, args);
        debug!(root = %root.display(), ?args, success = result.is_ok(), "build finished");
        match (outcome, result) {
            (Outcome::Ok(expectations), Ok(())) => {
                info!(count = expectations.len(), "build succeeded, verifying");
                self.verify(root, expectations)
            }
            (Outcome::Ok(_), Err(err)) => Err(HarnessError::Build(
                ErrorInfo::new("build_failed", err.to_string())
                    .with_context("args", args.join(" ")),
            )),
            (Outcome::Error(expected), Ok(())) => Err(HarnessError::Mismatch(
                ErrorInfo::new("unexpected_build_success", "build succeeded but an error was expected")
                    .with_context("expected", expected.to_string()),
            )),
            (Outcome::Error(expected), Err(actual)) if *expected == actual => Ok(()),
            (Outcome::Error(expected), Err(actual)) => Err(HarnessError::Mismatch(
                ErrorInfo::new("build_error_mismatch", "build failed with a different error")
                    .with_context("expected", expected.to_string())
                    .with_context("actual", actual.to_string()),
            )),
        }
    }
}

/// [`Verifier::run_and_check`] with the default verifier.
pub fn run_and_check<T: BuildTool>(
    tool: &mut T,
    root: &Path,
    args: &[String],
    outcome: &Outcome<T::Error>,
) -> Result<(), HarnessError> {
    Verifier::new().run_and_check(tool, root, args, outcome)
}

/// Failure of an external build command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("failed to spawn `{program}`: {message}")]
    Spawn { program: String, message: String },
    #[error("exit status {status:?}: {stderr}")]
    Exit { status: Option<i32>, stderr: String },
}

/// Runs an external executable with the project root as working directory.
#[derive(Debug, Clone)]
pub struct CommandTool {
    program: String,
}

impl CommandTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for CommandTool {
    fn default() -> Self {
        Self::new("rebar3")
    }
}

impl BuildTool for CommandTool {
    type Error = CommandError;

    fn run(&mut self, root: &Path, args: &[String]) -> Result<(), CommandError> {
        info!(program = %self.program, ?args, root = %root.display(), "running build");
        let output = Command::new(&self.program)
            .args(args)
            .current_dir(root)
            .output()
            .map_err(|err| CommandError::Spawn {
                program: self.program.clone(),
                message: err.to_string(),
            })?;
        if output.status.success() {
            Ok(())
        } else {
            Err(CommandError::Exit {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            })
        }
    }
}
