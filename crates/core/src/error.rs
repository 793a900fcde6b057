//! Error types for backup runs

use crate::snapshot::ArtifactKind;
use thiserror::Error;

/// Errors that end a backup run
///
/// All variants are fatal for the run in progress. The outer invoker only
/// ever sees the coarse outcome (verification marker present or not), so
/// these carry enough detail for the orchestrator-side logs.
#[derive(Debug, Error)]
pub enum BackupError {
    /// Orchestrator invoked as the wrong principal. No filesystem
    /// mutation has happened when this is returned.
    #[error("backup must run as '{expected}', not '{actual}'")]
    Permission { expected: String, actual: String },

    /// The timestamped run directory could not be created (including the
    /// already-exists case, which would mean a timestamp collision).
    #[error("failed to create snapshot directory {path}: {source}")]
    DirectoryCreation {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An external export command failed. Partial artifacts are left on
    /// disk for inspection; the run is abandoned.
    #[error("export of {kind} failed: {detail}")]
    Export { kind: ArtifactKind, detail: String },

    /// One or more required artifacts were missing at verification time.
    #[error("verification failed, missing artifacts: {missing:?}")]
    Verification { missing: Vec<ArtifactKind> },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for backup operations
pub type Result<T> = std::result::Result<T, BackupError>;
