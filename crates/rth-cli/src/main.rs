use std::error::Error;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use commands::{
    expand::{self, ExpandArgs},
    scaffold::{self, ScaffoldArgs},
    verify::{self, VerifyArgs},
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "rth", about = "Build-tool integration test harness")]
struct Cli {
    /// Tracing filter directive (`warn`, `info`, `rth_verify=debug`, ...).
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a list of expectations against a project's build output.
    Verify(VerifyArgs),
    /// Expand (and optionally flatten) a dependency declaration tree.
    Expand(ExpandArgs),
    /// Write a fixture application to disk.
    Scaffold(ScaffoldArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let result: Result<ExitCode, Box<dyn Error>> = match cli.command {
        Command::Verify(args) => verify::run(&args),
        Command::Expand(args) => expand::run(&args).map(|()| ExitCode::SUCCESS),
        Command::Scaffold(args) => scaffold::run(&args).map(|()| ExitCode::SUCCESS),
    };
    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}
