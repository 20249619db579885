use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which discovered apps an `app` expectation looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppFilter {
    /// Every discovered app.
    #[default]
    All,
    /// Only apps whose compiled resource and modules are all present.
    Valid,
    /// Only apps that failed validation.
    Invalid,
}

impl AppFilter {
    /// Whether an app with the given validity passes this filter.
    pub fn admits(self, valid: bool) -> bool {
        match self {
            AppFilter::All => true,
            AppFilter::Valid => valid,
            AppFilter::Invalid => !valid,
        }
    }
}

/// A single declarative assertion about build output.
///
/// Variants with an optional `version` cover both the name-only and the
/// name-and-version forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expectation {
    App {
        name: String,
        #[serde(default)]
        filter: AppFilter,
    },
    Checkout {
        name: String,
    },
    Dep {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<String>,
    },
    Plugin {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<String>,
    },
    Lock {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<String>,
    },
    Release {
        name: String,
        version: String,
        dev_mode: bool,
    },
    Tar {
        name: String,
        version: String,
    },
    File {
        path: PathBuf,
    },
}

impl Expectation {
    pub fn app(name: impl Into<String>) -> Self {
        Expectation::App {
            name: name.into(),
            filter: AppFilter::All,
        }
    }

    pub fn valid_app(name: impl Into<String>) -> Self {
        Expectation::App {
            name: name.into(),
            filter: AppFilter::Valid,
        }
    }

    pub fn invalid_app(name: impl Into<String>) -> Self {
        Expectation::App {
            name: name.into(),
            filter: AppFilter::Invalid,
        }
    }

    pub fn checkout(name: impl Into<String>) -> Self {
        Expectation::Checkout { name: name.into() }
    }

    pub fn dep(name: impl Into<String>) -> Self {
        Expectation::Dep {
            name: name.into(),
            version: None,
        }
    }

    pub fn dep_vsn(name: impl Into<String>, version: impl Into<String>) -> Self {
        Expectation::Dep {
            name: name.into(),
            version: Some(version.into()),
        }
    }

    pub fn plugin(name: impl Into<String>) -> Self {
        Expectation::Plugin {
            name: name.into(),
            version: None,
        }
    }

    pub fn plugin_vsn(name: impl Into<String>, version: impl Into<String>) -> Self {
        Expectation::Plugin {
            name: name.into(),
            version: Some(version.into()),
        }
    }

    pub fn lock(name: impl Into<String>) -> Self {
        Expectation::Lock {
            name: name.into(),
            version: None,
        }
    }

    pub fn lock_vsn(name: impl Into<String>, version: impl Into<String>) -> Self {
        Expectation::Lock {
            name: name.into(),
            version: Some(version.into()),
        }
    }

    pub fn release(name: impl Into<String>, version: impl Into<String>, dev_mode: bool) -> Self {
        Expectation::Release {
            name: name.into(),
            version: version.into(),
            dev_mode,
        }
    }

    pub fn tar(name: impl Into<String>, version: impl Into<String>) -> Self {
        Expectation::Tar {
            name: name.into(),
            version: version.into(),
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Expectation::File { path: path.into() }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::App { name, filter } => match filter {
                AppFilter::All => write!(f, "app {name}"),
                AppFilter::Valid => write!(f, "app {name} (valid)"),
                AppFilter::Invalid => write!(f, "app {name} (invalid)"),
            },
            Expectation::Checkout { name } => write!(f, "checkout {name}"),
            Expectation::Dep { name, version: None } => write!(f, "dep {name}"),
            Expectation::Dep { name, version: Some(v) } => write!(f, "dep {name} {v}"),
            Expectation::Plugin { name, version: None } => write!(f, "plugin {name}"),
            Expectation::Plugin { name, version: Some(v) } => write!(f, "plugin {name} {v}"),
            Expectation::Lock { name, version: None } => write!(f, "lock {name}"),
            Expectation::Lock { name, version: Some(v) } => write!(f, "lock {name} {v}"),
            Expectation::Release {
                name,
                version,
                dev_mode,
            } => write!(f, "release {name} {version} dev_mode={dev_mode}"),
            Expectation::Tar { name, version } => write!(f, "tar {name}-{version}"),
            Expectation::File { path } => write!(f, "file {}", path.display()),
        }
    }
}
