//! System configuration
//!
//! Loaded from a TOML file with per-field defaults, so a missing file or
//! a partial file both work. Nothing here is hard-coded at use sites:
//! debounce interval, retention age, expected principal, and the watched
//! and backup roots all come through this module.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub watch: WatchConfig,
    pub backup: BackupConfig,
    pub environment: EnvironmentConfig,
}

/// Change watcher and debounce settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Directory tree observed for changes
    pub watch_root: PathBuf,
    /// Minimum spacing between triggered backups, measured from the end
    /// of the previous triggered run
    pub debounce_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            watch_root: PathBuf::from("/data"),
            debounce_secs: 150,
        }
    }
}

/// Backup orchestrator and retention settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Root under which `auto-backups/<timestamp>/` directories are made
    pub backup_root: PathBuf,
    /// Principal the orchestrator must run as
    pub expected_user: String,
    /// Run directories older than this are pruned
    pub retention_days: u64,
    /// Application data directory captured by the full archive
    pub data_root: PathBuf,
    /// Export command templates. `{file}` expands to the artifact path,
    /// `{dir}` to the run directory, `{data}` to `data_root`.
    pub export_workflows_cmd: String,
    pub export_credentials_cmd: String,
    pub export_archive_cmd: String,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            backup_root: PathBuf::from("/backups"),
            expected_user: "node".to_string(),
            retention_days: 7,
            data_root: PathBuf::from("/data"),
            export_workflows_cmd: "n8n export:workflow --all --output={file}".to_string(),
            export_credentials_cmd: "n8n export:credentials --all --output={file}".to_string(),
            export_archive_cmd: "tar -czf {file} -C {data} .".to_string(),
        }
    }
}

/// Execution environment the orchestrator runs inside
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Container runtime binary (`docker`, `podman`)
    pub runtime: String,
    /// Container name. When unset, commands run directly on the host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            runtime: "docker".to_string(),
            container: None,
        }
    }
}

impl Config {
    /// Load configuration
    ///
    /// An explicit path must exist; the default path is allowed to be
    /// missing, in which case defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match config_file_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            if required {
                anyhow::bail!("config file not found: {}", path.display());
            }
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;

        Ok(config)
    }

    /// Validate ranges before any component consumes the config
    pub fn validate(&self) -> Result<()> {
        if self.watch.debounce_secs == 0 || self.watch.debounce_secs > 86_400 {
            anyhow::bail!(
                "watch.debounce_secs must be 1-86400, got {}",
                self.watch.debounce_secs
            );
        }
        if self.backup.retention_days == 0 || self.backup.retention_days > 365 {
            anyhow::bail!(
                "backup.retention_days must be 1-365, got {}",
                self.backup.retention_days
            );
        }
        if self.backup.expected_user.is_empty() {
            anyhow::bail!("backup.expected_user must not be empty");
        }
        if self.environment.runtime.is_empty() {
            anyhow::bail!("environment.runtime must not be empty");
        }
        Ok(())
    }
}

/// Default config file location (`~/.config/flowvault/config.toml`)
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("flowvault").join("config.toml"))
}

/// Render an example configuration file
pub fn example_config() -> String {
    let example = Config::default();
    toml::to_string_pretty(&example).unwrap_or_default()
}
