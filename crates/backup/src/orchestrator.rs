//! Backup orchestrator
//!
//! One `run_backup` call is one snapshot attempt: principal check, fresh
//! timestamped directory, fixed-order exports, retention pass, then local
//! verification. The orchestrator is invoked synchronously and never
//! concurrently (the debounce coordinator and the single-consumer watch
//! loop guarantee that), so runs are totally ordered by timestamp.

use crate::exporter::ArtifactExporter;
use crate::retention::{self, RetentionPolicy};
use crate::verify::verify_run;
use flowvault_core::error::Result;
use flowvault_core::{ArtifactKind, BackupError, SnapshotRun, AUTO_BACKUP_DIR};
use std::path::PathBuf;
use tracing::{info, warn};

/// Orchestrates snapshot runs against one backup root
pub struct Orchestrator<E: ArtifactExporter> {
    backup_root: PathBuf,
    expected_user: String,
    exporter: E,
    retention: RetentionPolicy,
}

impl<E: ArtifactExporter> Orchestrator<E> {
    pub fn new(
        backup_root: impl Into<PathBuf>,
        expected_user: impl Into<String>,
        exporter: E,
        retention: RetentionPolicy,
    ) -> Self {
        Self {
            backup_root: backup_root.into(),
            expected_user: expected_user.into(),
            exporter,
            retention,
        }
    }

    /// Run one complete backup
    ///
    /// On export or verification failure the partial directory is left on
    /// disk for inspection; the verification marker is only ever written
    /// by a fully successful run. Retention eventually removes abandoned
    /// directories by age.
    pub fn run_backup(&self) -> Result<SnapshotRun> {
        self.check_principal()?;

        let mut run = SnapshotRun::begin(&self.backup_root);
        info!("starting snapshot {}", run.timestamp);

        let auto_root = self.backup_root.join(AUTO_BACKUP_DIR);
        std::fs::create_dir_all(&auto_root).map_err(|e| BackupError::DirectoryCreation {
            path: auto_root.clone(),
            source: e,
        })?;

        // create_dir, not create_dir_all: an existing directory means a
        // timestamp collision and the run must fail rather than reuse it
        std::fs::create_dir(&run.directory).map_err(|e| BackupError::DirectoryCreation {
            path: run.directory.clone(),
            source: e,
        })?;

        for kind in ArtifactKind::ALL {
            self.exporter.export(kind, &run)?;
        }

        // Hygiene pass; never interleaved with an active run because the
        // run in progress is the one executing it
        match retention::prune(&auto_root, &self.retention) {
            Ok(stats) if stats.removed > 0 => {
                info!("retention removed {} old snapshot(s)", stats.removed);
            }
            Ok(_) => {}
            Err(e) => warn!("retention pass failed: {}", e),
        }

        verify_run(&mut run)?;
        Ok(run)
    }

    /// The orchestrator must run as the configured principal; a mismatch
    /// fails before any filesystem mutation
    fn check_principal(&self) -> Result<()> {
        let actual = current_username();
        if actual != self.expected_user {
            return Err(BackupError::Permission {
                expected: self.expected_user.clone(),
                actual,
            });
        }
        Ok(())
    }
}

/// Name of the effective user, falling back to the uid when the passwd
/// entry is unavailable
pub fn current_username() -> String {
    let uid = nix::unistd::geteuid();
    match nix::unistd::User::from_uid(uid) {
        Ok(Some(user)) => user.name,
        _ => uid.to_string(),
    }
}
