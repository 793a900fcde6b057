//! Run retention once

use anyhow::Result;
use backup::{prune, RetentionPolicy};
use flowvault_core::{Config, AUTO_BACKUP_DIR};
use owo_colors::OwoColorize;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;
    let auto_root = config.backup.backup_root.join(AUTO_BACKUP_DIR);
    let policy = RetentionPolicy {
        max_age_days: config.backup.retention_days,
    };

    println!(
        "{} (older than {} days)",
        "Pruning snapshots...".bold(),
        policy.max_age_days
    );

    let stats = prune(&auto_root, &policy)?;

    if stats.removed == 0 && stats.failed == 0 {
        println!("{}", "Nothing to prune".dimmed());
    } else {
        println!(
            "Removed {} of {} snapshot(s)",
            stats.removed.to_string().yellow(),
            stats.examined
        );
        if stats.failed > 0 {
            println!("{} {} deletion(s) failed, see logs", "!".red(), stats.failed);
        }
    }

    Ok(())
}
