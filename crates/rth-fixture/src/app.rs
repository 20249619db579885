use std::fs;
use std::path::{Path, PathBuf};

use rth_core::errors::HarnessError;
use rth_core::Term;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::sources;

/// Descriptor of a fixture package written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSpec {
    pub name: String,
    pub vsn: String,
    pub dir: PathBuf,
    pub deps: Vec<String>,
}

impl AppSpec {
    fn new(dir: &Path, name: &str, vsn: &str, deps: &[String]) -> Self {
        Self {
            name: name.to_string(),
            vsn: vsn.to_string(),
            dir: dir.to_path_buf(),
            deps: deps.to_vec(),
        }
    }
}

pub(crate) fn write_file(path: &Path, contents: &str) -> Result<(), HarnessError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| HarnessError::io("fixture_mkdir", parent, err))?;
    }
    fs::write(path, contents).map_err(|err| HarnessError::io("fixture_write", path, err))
}

fn write_app_src(dir: &Path, name: &str, vsn: &str, deps: &[String]) -> Result<(), HarnessError> {
    let path = dir.join("src").join(format!("{name}.app.src"));
    write_file(&path, &sources::app_resource(name, vsn, &[], deps))
}

/// Writes a minimal app: one module and its `.app.src`.
pub fn create_app(dir: &Path, name: &str, vsn: &str, deps: &[String]) -> Result<AppSpec, HarnessError> {
    write_file(&dir.join("src").join(format!("{name}.erl")), &sources::plain_module(name))?;
    write_app_src(dir, name, vsn, deps)?;
    info!(name, vsn, dir = %dir.display(), "created app fixture");
    Ok(AppSpec::new(dir, name, vsn, deps))
}

/// Like [`create_app`], with an inline eunit test and a `test/<name>_tests.erl` suite.
pub fn create_eunit_app(
    dir: &Path,
    name: &str,
    vsn: &str,
    deps: &[String],
) -> Result<AppSpec, HarnessError> {
    write_file(&dir.join("src").join(format!("{name}.erl")), &sources::eunit_module(name))?;
    write_file(
        &dir.join("test").join(format!("{name}_tests.erl")),
        &sources::eunit_suite(name),
    )?;
    write_app_src(dir, name, vsn, deps)?;
    info!(name, vsn, dir = %dir.display(), "created eunit app fixture");
    Ok(AppSpec::new(dir, name, vsn, deps))
}

/// Writes only `ebin/<name>.app` with no modules; discovery treats it as a
/// compiled, valid app.
pub fn create_empty_app(
    dir: &Path,
    name: &str,
    vsn: &str,
    deps: &[String],
) -> Result<AppSpec, HarnessError> {
    create_compiled_app(dir, name, vsn, &[], deps)
}

/// Writes `ebin/<name>.app` listing `modules` and an empty `ebin/<module>.beam`
/// for each of them.
pub fn create_compiled_app(
    dir: &Path,
    name: &str,
    vsn: &str,
    modules: &[&str],
    deps: &[String],
) -> Result<AppSpec, HarnessError> {
    let ebin = dir.join("ebin");
    write_file(
        &ebin.join(format!("{name}.app")),
        &sources::app_resource(name, vsn, modules, deps),
    )?;
    for module in modules {
        write_file(&ebin.join(format!("{module}.beam")), "")?;
    }
    info!(name, vsn, modules = modules.len(), dir = %dir.display(), "created compiled app fixture");
    Ok(AppSpec::new(dir, name, vsn, deps))
}

/// Writes a plugin app exposing `init/1`.
pub fn create_plugin(
    dir: &Path,
    name: &str,
    vsn: &str,
    deps: &[String],
) -> Result<AppSpec, HarnessError> {
    write_file(&dir.join("src").join(format!("{name}.erl")), &sources::plugin_module(name))?;
    write_app_src(dir, name, vsn, deps)?;
    info!(name, vsn, dir = %dir.display(), "created plugin fixture");
    Ok(AppSpec::new(dir, name, vsn, deps))
}

/// Writes `rebar.config` in `dir`, one term per line, and returns its path.
pub fn create_config(dir: &Path, terms: &[Term]) -> Result<PathBuf, HarnessError> {
    let path = dir.join("rebar.config");
    let contents: String = terms.iter().map(|term| format!("{term}.\n")).collect();
    write_file(&path, &contents)?;
    Ok(path)
}
