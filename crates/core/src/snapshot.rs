//! Snapshot run model and on-disk naming contract
//!
//! The directory layout produced by a run is load-bearing for external
//! tooling and must not change:
//!
//! ```text
//! <backup_root>/auto-backups/<YYYYMMDD_HHMMSS>/
//!     workflows.json
//!     credentials.json
//!     full_backup.tar.gz
//!     .backup_verified
//! ```

use chrono::{DateTime, Local, NaiveDateTime};
use std::fmt;
use std::path::{Path, PathBuf};

/// Subdirectory of the backup root holding timestamped run directories
pub const AUTO_BACKUP_DIR: &str = "auto-backups";

/// Zero-byte sentinel written only after every artifact is confirmed
/// present. Its presence is the sole externally observable proof that a
/// run succeeded.
pub const VERIFIED_MARKER: &str = ".backup_verified";

/// Directory-name timestamp format (local time)
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// One required output of a backup run
///
/// The artifact set of a run is fixed and known in advance; exports are
/// always performed in the order of [`ArtifactKind::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Workflow export
    Workflows,
    /// Credential export
    Credentials,
    /// Full state archive
    FullArchive,
}

impl ArtifactKind {
    /// Fixed export order: workflows, credentials, full archive
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::Workflows,
        ArtifactKind::Credentials,
        ArtifactKind::FullArchive,
    ];

    /// File name of this artifact inside the run directory
    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKind::Workflows => "workflows.json",
            ArtifactKind::Credentials => "credentials.json",
            ArtifactKind::FullArchive => "full_backup.tar.gz",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// One backup attempt: a timestamped directory exclusively owned by the
/// run that created it.
#[derive(Debug, Clone)]
pub struct SnapshotRun {
    /// Creation-time identifier, also the directory name
    pub timestamp: String,
    /// Directory created fresh for this run, never reused
    pub directory: PathBuf,
    /// True only after every required artifact was confirmed present.
    /// Set at most once, never unset.
    pub verified: bool,
}

impl SnapshotRun {
    /// Describe a new run starting now under `backup_root/auto-backups/`
    pub fn begin(backup_root: &Path) -> Self {
        Self::begin_at(backup_root, Local::now())
    }

    /// Describe a run with an explicit start time (tests)
    pub fn begin_at(backup_root: &Path, started: DateTime<Local>) -> Self {
        let timestamp = started.format(TIMESTAMP_FORMAT).to_string();
        let directory = backup_root.join(AUTO_BACKUP_DIR).join(&timestamp);
        Self {
            timestamp,
            directory,
            verified: false,
        }
    }

    /// Expected path of an artifact inside this run's directory
    pub fn artifact_path(&self, kind: ArtifactKind) -> PathBuf {
        self.directory.join(kind.file_name())
    }

    /// Path of the verification marker for this run
    pub fn marker_path(&self) -> PathBuf {
        self.directory.join(VERIFIED_MARKER)
    }
}

/// Parse a directory name as a run timestamp
///
/// Returns `None` for directories that do not follow the
/// `YYYYMMDD_HHMMSS` contract, so scans of the backup root skip
/// unrelated entries.
pub fn parse_run_timestamp(name: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(name, TIMESTAMP_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_format() {
        let started = Local.with_ymd_and_hms(2024, 3, 5, 14, 30, 9).unwrap();
        let run = SnapshotRun::begin_at(Path::new("/backups"), started);

        assert_eq!(run.timestamp, "20240305_143009");
        assert_eq!(
            run.directory,
            Path::new("/backups/auto-backups/20240305_143009")
        );
    }

    #[test]
    fn test_artifact_paths() {
        let started = Local.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let run = SnapshotRun::begin_at(Path::new("/b"), started);

        assert!(run
            .artifact_path(ArtifactKind::Workflows)
            .ends_with("workflows.json"));
        assert!(run
            .artifact_path(ArtifactKind::Credentials)
            .ends_with("credentials.json"));
        assert!(run
            .artifact_path(ArtifactKind::FullArchive)
            .ends_with("full_backup.tar.gz"));
        assert!(run.marker_path().ends_with(".backup_verified"));
    }

    #[test]
    fn test_timestamps_order_lexicographically() {
        let a = Local.with_ymd_and_hms(2024, 3, 5, 14, 30, 9).unwrap();
        let b = Local.with_ymd_and_hms(2024, 3, 5, 14, 30, 10).unwrap();
        let run_a = SnapshotRun::begin_at(Path::new("/b"), a);
        let run_b = SnapshotRun::begin_at(Path::new("/b"), b);

        // Later runs sort after earlier ones by name alone
        assert!(run_b.timestamp > run_a.timestamp);
    }

    #[test]
    fn test_parse_run_timestamp() {
        assert!(parse_run_timestamp("20240305_143009").is_some());
        assert!(parse_run_timestamp("not-a-run").is_none());
        assert!(parse_run_timestamp("2024-03-05").is_none());
        assert!(parse_run_timestamp(".backup_verified").is_none());
    }

    #[test]
    fn test_fixed_export_order() {
        assert_eq!(
            ArtifactKind::ALL,
            [
                ArtifactKind::Workflows,
                ArtifactKind::Credentials,
                ArtifactKind::FullArchive
            ]
        );
    }
}
