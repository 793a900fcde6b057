//! Run one backup synchronously

use crate::environment::build_environment;
use crate::invoker::{build_invoker, BackupOutcome};
use crate::util;
use anyhow::Result;
use flowvault_core::Config;
use owo_colors::OwoColorize;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;
    let env = build_environment(&config);
    let invoker = build_invoker(&config, env.as_ref(), config_path);

    println!("{}", "Running backup...".bold());

    match invoker.trigger_backup()? {
        BackupOutcome::Success { directory } => {
            println!("{} {}", "Backup verified".green().bold(), directory.display());
            println!();
            for (name, size) in util::list_run_files(&directory) {
                println!("  {:<24} {}", name, util::format_size(size).dimmed());
            }
            Ok(())
        }
        BackupOutcome::Failure { reason } => {
            eprintln!("{} {}", "Backup failed:".red().bold(), reason);
            anyhow::bail!("{reason}");
        }
    }
}
