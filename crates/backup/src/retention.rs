//! Retention manager
//!
//! Best-effort hygiene, never a correctness requirement: the prune is a
//! silent no-op without write permission on the backup root, and a failure
//! to delete one directory does not block pruning the rest. Verification
//! state is deliberately not consulted; an old failed run is pruned the
//! same as a verified one.

use flowvault_core::snapshot::parse_run_timestamp;
use nix::unistd::{access, AccessFlags};
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

/// Retention policy configuration
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    /// Run directories older than this many days are deleted
    pub max_age_days: u64,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self { max_age_days: 7 }
    }
}

impl RetentionPolicy {
    fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_days * 24 * 60 * 60)
    }
}

/// Outcome of one prune pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneStats {
    /// Run directories considered
    pub examined: usize,
    /// Run directories deleted
    pub removed: usize,
    /// Deletions that failed and were skipped
    pub failed: usize,
}

/// Delete timestamp-named run directories older than the policy allows
///
/// `root` is the directory holding the run directories
/// (`<backup_root>/auto-backups`). Only immediate subdirectories whose
/// names follow the run timestamp contract are ever touched.
pub fn prune(root: &Path, policy: &RetentionPolicy) -> anyhow::Result<PruneStats> {
    let mut stats = PruneStats::default();

    if !root.is_dir() {
        return Ok(stats);
    }

    if access(root, AccessFlags::W_OK).is_err() {
        debug!(
            "no write permission on {}, skipping retention",
            root.display()
        );
        return Ok(stats);
    }

    let cutoff = SystemTime::now() - policy.max_age();

    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name();

        if !path.is_dir() {
            continue;
        }
        let Some(name) = name.to_str() else { continue };
        if parse_run_timestamp(name).is_none() {
            continue;
        }

        stats.examined += 1;

        let mtime = match entry.metadata().and_then(|m| m.modified()) {
            Ok(t) => t,
            Err(e) => {
                warn!("could not stat {}: {}", path.display(), e);
                stats.failed += 1;
                continue;
            }
        };

        if mtime >= cutoff {
            continue;
        }

        match std::fs::remove_dir_all(&path) {
            Ok(()) => {
                info!("pruned snapshot {}", name);
                stats.removed += 1;
            }
            Err(e) => {
                // One locked directory must not block the others
                warn!("failed to prune {}: {}", path.display(), e);
                stats.failed += 1;
            }
        }
    }

    Ok(stats)
}
