//! Geocast command-line interface.
//!
//! # Quick Start
//!
//! ```bash
//! # Show the effective configuration for a project directory
//! geocast config --dir ./my-project
//!
//! # Run a scripted session against an in-memory store
//! geocast replay session.jsonl
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Geocast - clusters co-located live broadcasts into shared events.
#[derive(Parser)]
#[command(name = "geocast")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information.
    Version,

    /// Print the effective configuration as TOML.
    Config {
        /// Project directory holding geocast.toml / geocast.local.toml.
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Run a JSON-lines script of operations against an in-memory store.
    Replay {
        /// Script file, one JSON operation per line.
        script: PathBuf,

        /// Project directory holding geocast.toml / geocast.local.toml.
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Version => {
            commands::version::run();
            Ok(())
        }
        Commands::Config { dir } => {
            let config = commands::load_config(&dir)?;
            init_logging(&config.logging.level);
            commands::config::show(&config)
        }
        Commands::Replay { script, dir } => {
            let config = commands::load_config(&dir)?;
            init_logging(&config.logging.level);
            commands::replay::run(config, &script)
        }
    }
}
