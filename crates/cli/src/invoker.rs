//! Outer invoker
//!
//! Runs on the host side of the execution environment boundary: prepares
//! the backup root, asks the environment to run the orchestrator as the
//! expected principal, then judges the run purely by what is observable
//! from the host: the newest snapshot directory and its verification
//! marker. The invoker cannot see *why* a run failed, only that no
//! verified snapshot appeared.

use crate::environment::Environment;
use crate::util;
use anyhow::{Context, Result};
use flowvault_core::{Config, AUTO_BACKUP_DIR, VERIFIED_MARKER};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Host-visible outcome of one triggered backup
#[derive(Debug, Clone)]
pub enum BackupOutcome {
    Success { directory: PathBuf },
    Failure { reason: String },
}

impl BackupOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BackupOutcome::Success { .. })
    }
}

/// Triggers backups through the execution environment
pub struct OuterInvoker<'a, E: Environment + ?Sized> {
    config: &'a Config,
    env: &'a E,
    orchestrate_argv: Vec<String>,
    /// Host config file to copy into the environment before running
    config_push: Option<(PathBuf, PathBuf)>,
}

impl<'a, E: Environment + ?Sized> OuterInvoker<'a, E> {
    pub fn new(config: &'a Config, env: &'a E, orchestrate_argv: Vec<String>) -> Self {
        Self {
            config,
            env,
            orchestrate_argv,
            config_push: None,
        }
    }

    pub fn with_config_push(mut self, src: PathBuf, dest: PathBuf) -> Self {
        self.config_push = Some((src, dest));
        self
    }

    /// Trigger one backup and verify it from the host side
    pub fn trigger_backup(&self) -> Result<BackupOutcome> {
        let auto_root = self.config.backup.backup_root.join(AUTO_BACKUP_DIR);

        // Host-side directory must be writable by the environment's
        // principal, whose uid we do not control
        std::fs::create_dir_all(&auto_root)
            .with_context(|| format!("failed to create {}", auto_root.display()))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&auto_root, std::fs::Permissions::from_mode(0o777))?;
        }

        // Matching writable mount point inside the environment
        self.env
            .ensure_dir(&auto_root, 0o777)
            .context("failed to prepare backup directory inside environment")?;

        if let Some((src, dest)) = &self.config_push {
            self.env
                .copy_in(src, dest)
                .context("failed to copy configuration into environment")?;
        }

        let output = self
            .env
            .run_as(&self.config.backup.expected_user, &self.orchestrate_argv)
            .context("failed to run backup inside environment")?;
        if !output.stdout.trim().is_empty() {
            info!("orchestrator output:\n{}", output.stdout.trim());
        }
        if !output.success() {
            warn!(
                "orchestrator exited with {}: {}",
                output.exit_code,
                output.stderr.trim()
            );
        }

        // The marker is the only proof that counts, whatever the exit
        // status claimed
        match util::latest_run_dir(&auto_root) {
            Some(directory) if directory.join(VERIFIED_MARKER).is_file() => {
                Ok(BackupOutcome::Success { directory })
            }
            _ => Ok(BackupOutcome::Failure {
                reason: "backup failed or could not be verified".to_string(),
            }),
        }
    }
}

/// Build the argv that runs the orchestrator inside the environment
pub fn orchestrate_argv(containerized: bool, config_path: Option<&Path>) -> Vec<String> {
    let mut argv = if containerized {
        // The binary installed inside the container
        vec!["fv".to_string()]
    } else {
        let exe = std::env::current_exe()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_else(|_| "fv".to_string());
        vec![exe]
    };
    argv.push("orchestrate".to_string());
    if let Some(path) = config_path {
        argv.push("--config".to_string());
        argv.push(path.to_string_lossy().to_string());
    }
    argv
}

/// Wire an invoker for the configured environment
///
/// When containerized, the host config file is pushed to a fixed path
/// inside the container so the orchestrator sees the same settings.
pub fn build_invoker<'a>(
    config: &'a Config,
    env: &'a dyn Environment,
    config_path: Option<&Path>,
) -> OuterInvoker<'a, dyn Environment + 'a> {
    const ENV_CONFIG_PATH: &str = "/tmp/flowvault.toml";

    let containerized = config.environment.container.is_some();
    if containerized {
        match config_path {
            Some(src) => OuterInvoker::new(
                config,
                env,
                orchestrate_argv(true, Some(Path::new(ENV_CONFIG_PATH))),
            )
            .with_config_push(src.to_path_buf(), PathBuf::from(ENV_CONFIG_PATH)),
            None => OuterInvoker::new(config, env, orchestrate_argv(true, None)),
        }
    } else {
        OuterInvoker::new(config, env, orchestrate_argv(false, config_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::ExecOutput;
    use flowvault_core::snapshot::TIMESTAMP_FORMAT;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    /// Environment that fakes the orchestrator's filesystem effects
    struct FakeEnv {
        calls: RefCell<Vec<String>>,
        /// Snapshot directory written when the orchestrator "runs";
        /// `None` simulates a run that produced nothing
        writes_snapshot: Option<SnapshotSpec>,
    }

    struct SnapshotSpec {
        auto_root: PathBuf,
        verified: bool,
    }

    impl Environment for FakeEnv {
        fn ensure_dir(&self, path: &Path, _mode: u32) -> Result<()> {
            self.calls
                .borrow_mut()
                .push(format!("ensure_dir {}", path.display()));
            Ok(())
        }

        fn run_as(&self, user: &str, _argv: &[String]) -> Result<ExecOutput> {
            self.calls.borrow_mut().push(format!("run_as {user}"));
            if let Some(spec) = &self.writes_snapshot {
                let name = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
                let dir = spec.auto_root.join(name);
                fs::create_dir_all(&dir).unwrap();
                fs::write(dir.join("workflows.json"), b"[]").unwrap();
                if spec.verified {
                    fs::write(dir.join("credentials.json"), b"[]").unwrap();
                    fs::write(dir.join("full_backup.tar.gz"), b"tar").unwrap();
                    fs::write(dir.join(VERIFIED_MARKER), b"").unwrap();
                }
            }
            Ok(ExecOutput {
                exit_code: 0,
                stdout: String::new(),
                stderr: String::new(),
            })
        }

        fn copy_in(&self, src: &Path, dest: &Path) -> Result<()> {
            self.calls
                .borrow_mut()
                .push(format!("copy_in {} {}", src.display(), dest.display()));
            Ok(())
        }
    }

    fn config_for(root: &Path) -> Config {
        let mut config = Config::default();
        config.backup.backup_root = root.to_path_buf();
        config
    }

    #[test]
    fn test_verified_snapshot_reported_as_success() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_for(temp_dir.path());
        let env = FakeEnv {
            calls: RefCell::new(Vec::new()),
            writes_snapshot: Some(SnapshotSpec {
                auto_root: temp_dir.path().join(AUTO_BACKUP_DIR),
                verified: true,
            }),
        };

        let invoker = OuterInvoker::new(&config, &env, vec!["fv".into(), "orchestrate".into()]);
        let outcome = invoker.trigger_backup().unwrap();

        match outcome {
            BackupOutcome::Success { directory } => {
                assert!(directory.join(VERIFIED_MARKER).is_file());
            }
            BackupOutcome::Failure { reason } => panic!("unexpected failure: {reason}"),
        }

        // Environment prep happened before the run
        let calls = env.calls.borrow();
        assert!(calls[0].starts_with("ensure_dir"));
        assert_eq!(calls[1], "run_as node");
    }

    #[test]
    fn test_unverified_snapshot_reported_as_failure() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_for(temp_dir.path());
        let env = FakeEnv {
            calls: RefCell::new(Vec::new()),
            writes_snapshot: Some(SnapshotSpec {
                auto_root: temp_dir.path().join(AUTO_BACKUP_DIR),
                verified: false,
            }),
        };

        let invoker = OuterInvoker::new(&config, &env, vec!["fv".into(), "orchestrate".into()]);
        let outcome = invoker.trigger_backup().unwrap();

        match outcome {
            BackupOutcome::Failure { reason } => {
                assert!(reason.contains("failed or could not be verified"));
            }
            BackupOutcome::Success { .. } => panic!("unverified run must not be a success"),
        }
    }

    #[test]
    fn test_no_snapshot_at_all_is_a_failure() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_for(temp_dir.path());
        let env = FakeEnv {
            calls: RefCell::new(Vec::new()),
            writes_snapshot: None,
        };

        let invoker = OuterInvoker::new(&config, &env, vec!["fv".into(), "orchestrate".into()]);
        let outcome = invoker.trigger_backup().unwrap();
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_config_push_copies_before_running() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_for(temp_dir.path());
        let env = FakeEnv {
            calls: RefCell::new(Vec::new()),
            writes_snapshot: None,
        };

        let src = temp_dir.path().join("config.toml");
        fs::write(&src, b"").unwrap();

        let invoker = OuterInvoker::new(&config, &env, vec!["fv".into(), "orchestrate".into()])
            .with_config_push(src, PathBuf::from("/tmp/flowvault.toml"));
        invoker.trigger_backup().unwrap();

        let calls = env.calls.borrow();
        let copy_idx = calls.iter().position(|c| c.starts_with("copy_in")).unwrap();
        let run_idx = calls.iter().position(|c| c.starts_with("run_as")).unwrap();
        assert!(copy_idx < run_idx);
    }

    #[test]
    fn test_orchestrate_argv_shapes() {
        let argv = orchestrate_argv(true, Some(Path::new("/tmp/fv.toml")));
        assert_eq!(argv[0], "fv");
        assert_eq!(argv[1], "orchestrate");
        assert_eq!(&argv[2..], &["--config".to_string(), "/tmp/fv.toml".to_string()]);

        let argv = orchestrate_argv(false, None);
        assert_eq!(argv.last().unwrap(), "orchestrate");
    }
}
