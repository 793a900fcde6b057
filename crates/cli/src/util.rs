//! Shared utilities for CLI commands

use flowvault_core::snapshot::parse_run_timestamp;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Newest run directory under the auto-backups root
///
/// Run directory names are timestamps, so the lexicographically greatest
/// name is the most recently created run. Entries that do not follow the
/// naming contract are skipped.
pub fn latest_run_dir(auto_root: &Path) -> Option<PathBuf> {
    let mut newest: Option<(String, PathBuf)> = None;

    // Unreadable entries are skipped, not fatal; one bad entry must not
    // hide an existing verified snapshot from the invoker
    for entry in std::fs::read_dir(auto_root).ok()?.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if parse_run_timestamp(&name).is_none() {
            continue;
        }
        match &newest {
            Some((best, _)) if *best >= name => {}
            _ => newest = Some((name, path)),
        }
    }

    newest.map(|(_, path)| path)
}

/// Files inside a run directory with their sizes, sorted by name
pub fn list_run_files(dir: &Path) -> Vec<(String, u64)> {
    let mut files: Vec<(String, u64)> = WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let size = e.metadata().ok()?.len();
            let name = e
                .path()
                .strip_prefix(dir)
                .ok()?
                .to_string_lossy()
                .to_string();
            Some((name, size))
        })
        .collect();
    files.sort();
    files
}

/// Format file size in human-readable format
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_latest_run_dir_picks_greatest_timestamp() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir(root.join("20240101_000000")).unwrap();
        fs::create_dir(root.join("20240301_120000")).unwrap();
        fs::create_dir(root.join("20240201_060000")).unwrap();
        // Non-run entries are ignored
        fs::create_dir(root.join("scratch")).unwrap();
        fs::write(root.join("README"), b"").unwrap();

        let latest = latest_run_dir(root).unwrap();
        assert!(latest.ends_with("20240301_120000"));
    }

    #[cfg(unix)]
    #[test]
    fn test_latest_run_dir_survives_broken_entries() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir(root.join("20240101_000000")).unwrap();
        // Dangling symlink with a run-shaped name; stat on it fails but
        // the scan must carry on to the real snapshot
        std::os::unix::fs::symlink(root.join("gone"), root.join("20240901_000000")).unwrap();
        fs::create_dir(root.join("20240301_120000")).unwrap();

        let latest = latest_run_dir(root).unwrap();
        assert!(latest.ends_with("20240301_120000"));
    }

    #[test]
    fn test_latest_run_dir_empty_root() {
        let temp_dir = TempDir::new().unwrap();
        assert!(latest_run_dir(temp_dir.path()).is_none());
        assert!(latest_run_dir(&temp_dir.path().join("missing")).is_none());
    }

    #[test]
    fn test_list_run_files() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("workflows.json"), b"[]").unwrap();
        fs::write(dir.join("full_backup.tar.gz"), vec![0u8; 2048]).unwrap();

        let files = list_run_files(dir);
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].0, "full_backup.tar.gz");
        assert_eq!(files[0].1, 2048);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1024 * 1024), "1.00 MB");
    }
}
