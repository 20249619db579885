use std::error::Error;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use rth_core::IdentGenerator;
use rth_fixture::{create_app, create_empty_app, create_eunit_app, create_plugin, AppSpec};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FixtureKind {
    /// Module plus `.app.src`.
    #[default]
    App,
    /// App with an inline eunit test and a test suite.
    Eunit,
    /// Compiled `.app` only.
    Empty,
    /// Plugin module exposing `init/1`.
    Plugin,
}

#[derive(Args, Debug)]
pub struct ScaffoldArgs {
    /// Directory to write the app into.
    #[arg(long)]
    pub dir: PathBuf,
    /// App name; generated when omitted.
    #[arg(long)]
    pub name: Option<String>,
    /// App version; generated when omitted.
    #[arg(long)]
    pub vsn: Option<String>,
    #[arg(long, value_enum, default_value_t = FixtureKind::App)]
    pub kind: FixtureKind,
    /// Runtime dependencies listed in the app resource.
    #[arg(long = "dep", value_name = "NAME")]
    pub deps: Vec<String>,
    /// Seed for generated identifiers.
    #[arg(long)]
    pub seed: Option<u64>,
}

pub(crate) fn scaffold(args: &ScaffoldArgs) -> Result<AppSpec, Box<dyn Error>> {
    let mut ids = match args.seed {
        Some(seed) => IdentGenerator::from_seed(seed),
        None => IdentGenerator::from_entropy(),
    };
    let name = args.name.clone().unwrap_or_else(|| ids.random_name("app_"));
    let vsn = args.vsn.clone().unwrap_or_else(|| ids.random_vsn());
    let create = match args.kind {
        FixtureKind::App => create_app,
        FixtureKind::Eunit => create_eunit_app,
        FixtureKind::Empty => create_empty_app,
        FixtureKind::Plugin => create_plugin,
    };
    Ok(create(&args.dir, &name, &vsn, &args.deps)?)
}

pub fn run(args: &ScaffoldArgs) -> Result<(), Box<dyn Error>> {
    let spec = scaffold(args)?;
    println!("{}", serde_json::to_string_pretty(&spec)?);
    Ok(())
}
