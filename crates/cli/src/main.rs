//! Flowvault CLI - fv command

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;
mod environment;
mod invoker;
mod util;

/// Flowvault - automated, verified backups for a workflow service
#[derive(Parser)]
#[command(name = "fv")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one backup synchronously and verify it
    Run,
    /// Watch for changes and trigger debounced backups until stopped
    Watch {
        /// Timer-only mode: trigger every N seconds instead of watching
        #[arg(long, value_name = "SECS")]
        timer: Option<u64>,
    },
    /// Run the backup orchestrator in-process (invoked inside the
    /// execution environment)
    #[command(hide = true)]
    Orchestrate,
    /// Delete snapshots older than the retention window
    Prune,
    /// Show the newest snapshot and its verification state
    Status,
    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print an example configuration file
    Example,
    /// Print the default configuration file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config_path = cli.config.clone();

    match cli.command {
        Commands::Run => cmd::run::run(config_path.as_deref()).await,
        Commands::Watch { timer } => cmd::watch::run(config_path.as_deref(), timer).await,
        Commands::Orchestrate => cmd::orchestrate::run(config_path.as_deref()).await,
        Commands::Prune => cmd::prune::run(config_path.as_deref()).await,
        Commands::Status => cmd::status::run(config_path.as_deref()).await,
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Example => cmd::config::run_example().await,
            ConfigCommands::Path => cmd::config::run_path().await,
        },
    }
}
