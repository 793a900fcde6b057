//! Run verification
//!
//! The marker is written strictly after every required artifact is
//! confirmed present, so a run directory is never partially visible as
//! "verified". Existence is the whole check; content validation is the
//! export tooling's problem.

use flowvault_core::error::Result;
use flowvault_core::{ArtifactKind, BackupError, SnapshotRun};
use tracing::{error, info};

/// Confirm all required artifacts exist, then write the marker
///
/// On any missing artifact, no marker is written and the run is failed
/// exactly as if an export had failed.
pub fn verify_run(run: &mut SnapshotRun) -> Result<()> {
    let missing: Vec<ArtifactKind> = ArtifactKind::ALL
        .into_iter()
        .filter(|kind| !run.artifact_path(*kind).is_file())
        .collect();

    if !missing.is_empty() {
        error!(
            "snapshot {} incomplete, missing {:?}",
            run.timestamp, missing
        );
        return Err(BackupError::Verification { missing });
    }

    std::fs::write(run.marker_path(), b"")?;
    run.verified = true;
    info!("snapshot {} verified", run.timestamp);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use std::fs;
    use tempfile::TempDir;

    fn prepared_run(root: &std::path::Path) -> SnapshotRun {
        let started = Local.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let run = SnapshotRun::begin_at(root, started);
        fs::create_dir_all(&run.directory).unwrap();
        run
    }

    #[test]
    fn test_marker_written_when_all_artifacts_present() {
        let temp_dir = TempDir::new().unwrap();
        let mut run = prepared_run(temp_dir.path());

        for kind in ArtifactKind::ALL {
            fs::write(run.artifact_path(kind), b"data").unwrap();
        }

        verify_run(&mut run).unwrap();
        assert!(run.verified);
        assert!(run.marker_path().is_file());
    }

    #[test]
    fn test_missing_artifact_means_no_marker() {
        let temp_dir = TempDir::new().unwrap();
        let mut run = prepared_run(temp_dir.path());

        fs::write(run.artifact_path(ArtifactKind::Workflows), b"data").unwrap();
        fs::write(run.artifact_path(ArtifactKind::FullArchive), b"data").unwrap();

        let err = verify_run(&mut run).unwrap_err();
        match err {
            BackupError::Verification { missing } => {
                assert_eq!(missing, vec![ArtifactKind::Credentials]);
            }
            other => panic!("expected verification error, got {other:?}"),
        }
        assert!(!run.verified);
        assert!(!run.marker_path().exists());
    }

    #[test]
    fn test_rerun_after_supplying_missing_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let mut run = prepared_run(temp_dir.path());

        fs::write(run.artifact_path(ArtifactKind::Workflows), b"data").unwrap();
        assert!(verify_run(&mut run).is_err());
        assert!(!run.marker_path().exists());

        fs::write(run.artifact_path(ArtifactKind::Credentials), b"data").unwrap();
        fs::write(run.artifact_path(ArtifactKind::FullArchive), b"data").unwrap();

        verify_run(&mut run).unwrap();
        assert!(run.marker_path().is_file());
    }
}
