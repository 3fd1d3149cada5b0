//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use threadview_core::config::{CONFIG_ENV, ViewConfig};
use threadview_core::logging;

mod commands;

#[derive(Parser)]
#[command(name = "threadview")]
#[command(version)]
#[command(about = "Drive thread views from scripted scenarios")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file (default: ./threadview.toml)
    #[arg(long, global = true, value_name = "PATH", env = CONFIG_ENV)]
    config: Option<PathBuf>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Replays a JSON scenario against a fresh view and prints the outcome
    Replay {
        /// Scenario script (JSON)
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,
    },
    /// Prints the effective configuration as TOML
    Config,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(None)?;

    let config = match cli.config.as_deref() {
        Some(path) => ViewConfig::load_from(path),
        None => ViewConfig::load(),
    }
    .context("load config")?;

    match cli.command {
        Commands::Replay { script } => {
            let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
            rt.block_on(commands::replay::run(&script, config))
        }
        Commands::Config => commands::config::show(&config),
    }
}
