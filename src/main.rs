mod commands;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use schedsync_core::config::SyncConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schedsync")]
#[command(about = "Keep Notion schedule records and Google Calendar events in sync")]
struct Cli {
    /// Log decisions as well as changes
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of ~/.config/schedsync/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one synchronization
    Sync,
    /// Show what a sync would change, without changing anything
    Status,
    /// Sync periodically until interrupted
    Watch {
        /// Time between runs (e.g. "15m", "1h"), overrides the config
        #[arg(short, long)]
        interval: Option<String>,
    },
    /// Connect a Google account
    Auth,
    /// Verify configuration and connectivity
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Sync => commands::sync::run(&SyncConfig::load(config_path)?).await,
        Commands::Status => commands::status::run(&SyncConfig::load(config_path)?).await,
        Commands::Watch { interval } => {
            commands::watch::run(&SyncConfig::load(config_path)?, interval.as_deref()).await
        }
        Commands::Auth => commands::auth::run().await,
        Commands::Check => commands::check::run(config_path).await,
    }
}

/// Logs go to stderr so they never mix with rendered output.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
