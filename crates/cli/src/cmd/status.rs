//! Show the newest snapshot and its verification state

use crate::util;
use anyhow::Result;
use chrono::{Local, TimeZone};
use flowvault_core::snapshot::parse_run_timestamp;
use flowvault_core::{Config, AUTO_BACKUP_DIR, VERIFIED_MARKER};
use owo_colors::OwoColorize;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;
    let auto_root = config.backup.backup_root.join(AUTO_BACKUP_DIR);

    let Some(directory) = util::latest_run_dir(&auto_root) else {
        println!("No snapshots under {}", auto_root.display());
        return Ok(());
    };

    let name = directory
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    println!("{} {}", "Latest snapshot:".bold(), name);
    if let Some(age) = snapshot_age(&name) {
        println!("{}  {}", "Created:".dimmed(), age);
    }

    if directory.join(VERIFIED_MARKER).is_file() {
        println!("{}   {}", "Status:".dimmed(), "verified".green());
    } else {
        println!("{}   {}", "Status:".dimmed(), "NOT verified".red());
    }

    println!();
    let files = util::list_run_files(&directory);
    let mut total = 0u64;
    for (file, size) in &files {
        println!("  {:<24} {}", file, util::format_size(*size).dimmed());
        total += size;
    }
    println!();
    println!("Total size: {}", util::format_size(total));

    Ok(())
}

/// Human-readable age of a snapshot from its directory name
fn snapshot_age(name: &str) -> Option<String> {
    let naive = parse_run_timestamp(name)?;
    let created = Local.from_local_datetime(&naive).single()?;
    let elapsed = Local::now().signed_duration_since(created);

    let seconds = elapsed.num_seconds().max(0);
    let age = if seconds < 60 {
        format!("{seconds} seconds ago")
    } else if seconds < 3600 {
        format!("{} minutes ago", seconds / 60)
    } else if seconds < 86_400 {
        format!("{} hours ago", seconds / 3600)
    } else {
        format!("{} days ago", seconds / 86_400)
    };
    Some(age)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_age_parses_run_names() {
        assert!(snapshot_age("20240101_120000").is_some());
        assert!(snapshot_age("not-a-snapshot").is_none());
    }
}
