//! Artifact exporter capability
//!
//! The orchestrator never talks to the application's export tooling
//! directly; it goes through [`ArtifactExporter`], so tests can substitute
//! fakes and the production path can shell out to whatever commands the
//! deployment configures.

use flowvault_core::config::BackupConfig;
use flowvault_core::error::Result;
use flowvault_core::{ArtifactKind, BackupError, SnapshotRun};
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, info};

/// Produces one artifact of a snapshot run
pub trait ArtifactExporter {
    /// Export `kind` into the run directory, returning the artifact path
    fn export(&self, kind: ArtifactKind, run: &SnapshotRun) -> Result<PathBuf>;
}

/// Runs the configured external export command for each artifact kind
///
/// Templates support `{file}` (artifact path), `{dir}` (run directory),
/// and `{data}` (application data root).
pub struct CommandExporter {
    workflows_cmd: String,
    credentials_cmd: String,
    archive_cmd: String,
    data_root: PathBuf,
}

impl CommandExporter {
    pub fn from_config(config: &BackupConfig) -> Self {
        Self {
            workflows_cmd: config.export_workflows_cmd.clone(),
            credentials_cmd: config.export_credentials_cmd.clone(),
            archive_cmd: config.export_archive_cmd.clone(),
            data_root: config.data_root.clone(),
        }
    }

    fn template_for(&self, kind: ArtifactKind) -> &str {
        match kind {
            ArtifactKind::Workflows => &self.workflows_cmd,
            ArtifactKind::Credentials => &self.credentials_cmd,
            ArtifactKind::FullArchive => &self.archive_cmd,
        }
    }

    fn render(&self, kind: ArtifactKind, run: &SnapshotRun) -> String {
        self.template_for(kind)
            .replace("{file}", &run.artifact_path(kind).to_string_lossy())
            .replace("{dir}", &run.directory.to_string_lossy())
            .replace("{data}", &self.data_root.to_string_lossy())
    }
}

impl ArtifactExporter for CommandExporter {
    fn export(&self, kind: ArtifactKind, run: &SnapshotRun) -> Result<PathBuf> {
        let command = self.render(kind, run);
        debug!("exporting {}: {}", kind, command);

        let output = Command::new("sh")
            .arg("-c")
            .arg(&command)
            .output()
            .map_err(|e| BackupError::Export {
                kind,
                detail: format!("failed to spawn export command: {e}"),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BackupError::Export {
                kind,
                detail: format!(
                    "export command exited with {} ({})",
                    output.status,
                    stderr.trim()
                ),
            });
        }

        info!("exported {}", kind);
        Ok(run.artifact_path(kind))
    }
}
