//! Inspect configuration

use anyhow::Result;
use flowvault_core::config::{config_file_path, example_config};
use owo_colors::OwoColorize;

/// Print an example configuration file
pub async fn run_example() -> Result<()> {
    print!("{}", example_config());
    Ok(())
}

/// Print the default config file path and whether it exists
pub async fn run_path() -> Result<()> {
    match config_file_path() {
        Some(path) => {
            println!("{}", path.display());
            if !path.exists() {
                println!(
                    "{}",
                    "File does not exist; defaults apply. Generate one with 'fv config example'."
                        .yellow()
                );
            }
            Ok(())
        }
        None => anyhow::bail!("could not determine config directory"),
    }
}
