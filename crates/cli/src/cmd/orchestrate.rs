//! Run the backup orchestrator in-process
//!
//! This is the command the outer invoker executes inside the isolated
//! environment. It is hidden from help output; operators normally go
//! through `fv run` or `fv watch`.

use anyhow::{Context, Result};
use backup::{CommandExporter, Orchestrator, RetentionPolicy};
use flowvault_core::Config;
use owo_colors::OwoColorize;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    let exporter = CommandExporter::from_config(&config.backup);
    let orchestrator = Orchestrator::new(
        &config.backup.backup_root,
        config.backup.expected_user.clone(),
        exporter,
        RetentionPolicy {
            max_age_days: config.backup.retention_days,
        },
    );

    let run = orchestrator
        .run_backup()
        .context("backup run failed")?;

    println!(
        "{} snapshot {} verified",
        "✓".green(),
        run.timestamp.bold()
    );
    println!("{}", run.directory.display());
    Ok(())
}
