#![allow(clippy::print_stdout)]

pub mod config;
pub mod scenarios;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "herald")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Walkthroughs of the herald event emitter")]
pub struct Cli {
    /// TOML file with `log_level` and `[emitter]` settings.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: DemoCommand,
}

#[derive(Debug, Subcommand)]
pub enum DemoCommand {
    /// Rename a person and greet every new name
    Person {
        /// Names to assign, in order
        #[arg(short, long = "name", required = true)]
        names: Vec<String>,
    },
    /// Click a button wired to a dialog
    Widgets {
        #[arg(short = 'n', long, default_value_t = 1)]
        clicks: u32,
    },
    /// Have lunch with typed subscribers
    Lunch,
    /// Run the hand-written observer
    Observer,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = config::load_config(cli.config.as_deref())?;
    init_tracing(&settings.log_level)?;
    info!(emitter = %settings.emitter.label, command = ?cli.command, "Starting walkthrough");

    let lines = match &cli.command {
        DemoCommand::Person { names } => scenarios::person(names, &settings.emitter)?,
        DemoCommand::Widgets { clicks } => scenarios::widgets(*clicks, &settings.emitter)?,
        DemoCommand::Lunch => scenarios::lunch(),
        DemoCommand::Observer => scenarios::observer(),
    };

    for line in lines {
        println!("{line}");
    }
    Ok(())
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let level: LevelFilter =
        level.parse().with_context(|| format!("Invalid log level '{level}'"))?;
    let filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}
