//! Structured error types shared across the harness crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`HarnessError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code (`dep_not_found`, `version_mismatch`, ...).
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (names, versions, paths).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Adds the offending path as context.
    pub fn with_path(self, path: &Path) -> Self {
        self.with_context("path", path.display().to_string())
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the harness.
///
/// Every verification failure aborts the current run; the variant names the
/// failure family and the payload carries the stable code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum HarnessError {
    /// An expected item (app, dep, plugin, lock entry, release, file) is absent.
    #[error("not found: {0}")]
    NotFound(ErrorInfo),
    /// The item exists but differs from the expectation.
    #[error("mismatch: {0}")]
    Mismatch(ErrorInfo),
    /// Malformed or unsupported input handed to the harness.
    #[error("contract violation: {0}")]
    Contract(ErrorInfo),
    /// The build command itself failed.
    #[error("build error: {0}")]
    Build(ErrorInfo),
    /// Filesystem access failed.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// A term, lock or configuration file could not be parsed.
    #[error("parse error: {0}")]
    Parse(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl HarnessError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            HarnessError::NotFound(info)
            | HarnessError::Mismatch(info)
            | HarnessError::Contract(info)
            | HarnessError::Build(info)
            | HarnessError::Io(info)
            | HarnessError::Parse(info) => info,
        }
    }

    /// Returns the stable error code.
    pub fn code(&self) -> &str {
        &self.info().code
    }

    /// Builds a [`HarnessError::NotFound`] for a named item.
    pub fn not_found(code: &str, name: &str) -> Self {
        HarnessError::NotFound(
            ErrorInfo::new(code, format!("`{name}` was not found")).with_context("name", name),
        )
    }

    /// Builds a [`HarnessError::Mismatch`] recording both sides of the comparison.
    pub fn mismatch(code: &str, name: &str, expected: &str, actual: &str) -> Self {
        HarnessError::Mismatch(
            ErrorInfo::new(
                code,
                format!("`{name}`: expected {expected}, found {actual}"),
            )
            .with_context("name", name)
            .with_context("expected", expected)
            .with_context("actual", actual),
        )
    }

    /// Wraps an I/O failure on `path`.
    pub fn io(code: &str, path: &Path, err: std::io::Error) -> Self {
        HarnessError::Io(ErrorInfo::new(code, err.to_string()).with_path(path))
    }
}
