//! Execution environment boundary
//!
//! The orchestrator runs inside an isolated environment (usually a
//! container). Everything the host side needs from that boundary is three
//! opaque pass/fail operations: make a directory, run a command as a
//! principal, copy a file in. [`ContainerEnv`] shells out to the container
//! runtime; [`HostEnv`] satisfies the same contract directly on the host
//! for non-containerized deployments and for tests.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Captured result of a command run inside the environment
#[derive(Debug, Clone)]
pub struct ExecOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    fn from_output(output: std::process::Output) -> Self {
        Self {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

/// Narrow interface to the isolated execution environment
pub trait Environment {
    /// Create a directory (and parents) inside the environment with the
    /// given mode
    fn ensure_dir(&self, path: &Path, mode: u32) -> Result<()>;

    /// Run a command inside the environment as the given principal,
    /// capturing output. A non-zero exit is reported in the output, not
    /// as an `Err`; `Err` means the environment itself failed.
    fn run_as(&self, user: &str, argv: &[String]) -> Result<ExecOutput>;

    /// Copy a host file into the environment
    fn copy_in(&self, src: &Path, dest: &Path) -> Result<()>;
}

/// Container-backed environment (`docker exec`, `docker cp`)
pub struct ContainerEnv {
    runtime: String,
    container: String,
}

impl ContainerEnv {
    pub fn new(runtime: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            runtime: runtime.into(),
            container: container.into(),
        }
    }

    fn exec_argv(&self, user: Option<&str>, argv: &[String]) -> Vec<String> {
        let mut full = vec!["exec".to_string()];
        if let Some(user) = user {
            full.push("-u".to_string());
            full.push(user.to_string());
        }
        full.push(self.container.clone());
        full.extend(argv.iter().cloned());
        full
    }

    fn runtime_command(&self, args: &[String]) -> Result<ExecOutput> {
        debug!("{} {}", self.runtime, args.join(" "));
        let output = Command::new(&self.runtime)
            .args(args)
            .output()
            .with_context(|| format!("failed to invoke container runtime '{}'", self.runtime))?;
        Ok(ExecOutput::from_output(output))
    }
}

impl Environment for ContainerEnv {
    fn ensure_dir(&self, path: &Path, mode: u32) -> Result<()> {
        let path = path.to_string_lossy().to_string();
        let mkdir = self.exec_argv(
            None,
            &["mkdir".to_string(), "-p".to_string(), path.clone()],
        );
        let out = self.runtime_command(&mkdir)?;
        if !out.success() {
            anyhow::bail!("mkdir inside container failed: {}", out.stderr.trim());
        }

        let chmod = self.exec_argv(
            None,
            &["chmod".to_string(), format!("{mode:o}"), path],
        );
        let out = self.runtime_command(&chmod)?;
        if !out.success() {
            anyhow::bail!("chmod inside container failed: {}", out.stderr.trim());
        }
        Ok(())
    }

    fn run_as(&self, user: &str, argv: &[String]) -> Result<ExecOutput> {
        let full = self.exec_argv(Some(user), argv);
        self.runtime_command(&full)
    }

    fn copy_in(&self, src: &Path, dest: &Path) -> Result<()> {
        let args = vec![
            "cp".to_string(),
            src.to_string_lossy().to_string(),
            format!("{}:{}", self.container, dest.to_string_lossy()),
        ];
        let out = self.runtime_command(&args)?;
        if !out.success() {
            anyhow::bail!("copy into container failed: {}", out.stderr.trim());
        }
        Ok(())
    }
}

/// Host-local environment for non-containerized deployments
pub struct HostEnv;

impl Environment for HostEnv {
    fn ensure_dir(&self, path: &Path, mode: u32) -> Result<()> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
                .with_context(|| format!("failed to chmod {}", path.display()))?;
        }
        Ok(())
    }

    fn run_as(&self, _user: &str, argv: &[String]) -> Result<ExecOutput> {
        // The orchestrator enforces the principal itself; on the host we
        // run as whoever invoked us
        let (program, args) = argv
            .split_first()
            .context("empty command for host environment")?;
        debug!("{}", argv.join(" "));
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("failed to run '{program}'"))?;
        Ok(ExecOutput::from_output(output))
    }

    fn copy_in(&self, src: &Path, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(src, dest)
            .with_context(|| format!("failed to copy {} to {}", src.display(), dest.display()))?;
        Ok(())
    }
}

/// Choose the environment implementation for the loaded configuration
pub fn build_environment(config: &flowvault_core::Config) -> Box<dyn Environment> {
    match &config.environment.container {
        Some(container) => Box::new(ContainerEnv::new(&config.environment.runtime, container)),
        None => Box::new(HostEnv),
    }
}
