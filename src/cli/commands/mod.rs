//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod export;
mod helpers;
mod scrape;
mod source;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "bikeacquire")]
#[command(about = "Used motorcycle listing acquisition")]
#[command(version)]
pub struct Cli {
    /// Data directory holding the database (overrides config file)
    #[arg(long, short = 'd', global = true, env = "BIKEACQUIRE_DATA_DIR")]
    data: Option<PathBuf>,

    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape listings from one or more sources
    Scrape {
        /// Source names to scrape (default: every enabled source)
        sources: Vec<String>,
    },

    /// Export stored listings as CSV
    Export {
        /// Output file
        path: PathBuf,
        /// Only export listings from this source
        #[arg(short, long)]
        source: Option<String>,
    },

    /// Show database status
    Status,

    /// Manage listing sources
    Source {
        #[command(subcommand)]
        command: SourceCommands,
    },
}

#[derive(Subcommand)]
enum SourceCommands {
    /// List configured sources
    List,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        data: cli.data,
    };
    let (settings, config) = load_settings_with_options(options).await?;

    match cli.command {
        Commands::Scrape { sources } => scrape::cmd_scrape(&settings, &config, &sources).await,
        Commands::Export { path, source } => {
            export::cmd_export(&settings, &path, source.as_deref()).await
        }
        Commands::Status => status::cmd_status(&settings).await,
        Commands::Source { command } => match command {
            SourceCommands::List => source::cmd_source_list(&config).await,
        },
    }
}
