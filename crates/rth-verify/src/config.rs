use std::fs;
use std::path::{Path, PathBuf};

use rth_core::errors::{ErrorInfo, HarnessError};
use serde::{Deserialize, Serialize};

/// Project layout the verifier inspects, relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Build output directory holding one sub-directory per profile.
    #[serde(default = "HarnessConfig::default_build_dir")]
    pub build_dir: PathBuf,
    /// Directory of checked-out dependencies that override fetched ones.
    #[serde(default = "HarnessConfig::default_checkouts_dir")]
    pub checkouts_dir: PathBuf,
    /// Lock file name.
    #[serde(default = "HarnessConfig::default_lock_file")]
    pub lock_file: PathBuf,
    /// Directory holding `<name>/<name>-<vsn>.tar.gz` release tarballs.
    #[serde(default = "HarnessConfig::default_tarball_dir")]
    pub tarball_dir: PathBuf,
    /// Enter the project root for the duration of each release check.
    #[serde(default = "HarnessConfig::default_release_requires_cwd")]
    pub release_requires_cwd: bool,
}

impl HarnessConfig {
    fn default_build_dir() -> PathBuf {
        PathBuf::from("_build")
    }

    fn default_checkouts_dir() -> PathBuf {
        PathBuf::from("_checkouts")
    }

    fn default_lock_file() -> PathBuf {
        PathBuf::from("rebar.lock")
    }

    fn default_tarball_dir() -> PathBuf {
        PathBuf::from("_build").join("rel")
    }

    const fn default_release_requires_cwd() -> bool {
        true
    }

    /// Parses a TOML document; missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, HarnessError> {
        toml::from_str(text)
            .map_err(|err| HarnessError::Parse(ErrorInfo::new("config_parse", err.to_string())))
    }

    /// Reads and parses a TOML config file.
    pub fn load(path: &Path) -> Result<Self, HarnessError> {
        let text =
            fs::read_to_string(path).map_err(|err| HarnessError::io("config_read", path, err))?;
        Self::from_toml_str(&text).map_err(|err| match err {
            HarnessError::Parse(info) => HarnessError::Parse(info.with_path(path)),
            other => other,
        })
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            build_dir: Self::default_build_dir(),
            checkouts_dir: Self::default_checkouts_dir(),
            lock_file: Self::default_lock_file(),
            tarball_dir: Self::default_tarball_dir(),
            release_requires_cwd: Self::default_release_requires_cwd(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(HarnessConfig::from_toml_str("").unwrap(), HarnessConfig::default());
    }

    #[test]
    fn partial_document_overrides_only_given_keys() {
        let config = HarnessConfig::from_toml_str(
            "lock_file = \"custom.lock\"\nrelease_requires_cwd = false\n",
        )
        .unwrap();
        assert_eq!(config.lock_file, PathBuf::from("custom.lock"));
        assert!(!config.release_requires_cwd);
        assert_eq!(config.build_dir, PathBuf::from("_build"));
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let err = HarnessConfig::from_toml_str("build_dir = [").unwrap_err();
        assert_eq!(err.code(), "config_parse");
    }
}
