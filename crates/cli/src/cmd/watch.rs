//! Watch for changes and trigger debounced backups
//!
//! Single logical consumer: signals are handled strictly sequentially and
//! a triggered backup blocks the loop for its full duration. That is the
//! mechanism keeping at most one snapshot run active at a time, so no
//! locking is needed anywhere in the pipeline.

use crate::environment::{build_environment, Environment};
use crate::invoker::{build_invoker, BackupOutcome, OuterInvoker};
use anyhow::Result;
use flowvault_core::Config;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};
use watcher::{ChangeWatcher, Debouncer};

pub async fn run(config_path: Option<&Path>, timer: Option<u64>) -> Result<()> {
    let config = Config::load(config_path)?;
    let env = build_environment(&config);
    let invoker = build_invoker(&config, env.as_ref(), config_path);

    match timer {
        Some(secs) => timer_loop(&invoker, secs).await,
        None => watch_loop(&config, &invoker).await,
    }
}

/// Event-driven mode: watcher feeds the debounce coordinator
async fn watch_loop(config: &Config, invoker: &OuterInvoker<'_, dyn Environment + '_>) -> Result<()> {
    let (tx, mut rx) = mpsc::channel(64);
    let watcher_task = tokio::spawn(ChangeWatcher::new(&config.watch.watch_root).run(tx));

    let mut debouncer = Debouncer::new(Duration::from_secs(config.watch.debounce_secs));

    info!(
        "watching {} (debounce {}s), stop with ctrl-c",
        config.watch.watch_root.display(),
        config.watch.debounce_secs
    );

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("termination signal received, shutting down");
                break;
            }
            signal = rx.recv() => {
                let Some(signal) = signal else { break };
                info!("change detected ({} path(s))", signal.paths.len());
                // Blocks the loop for the whole run, by design
                debouncer.on_change_signal(|| trigger(invoker));
            }
        }
    }

    // Aborting the task drops the watch session and its notify backend
    watcher_task.abort();
    Ok(())
}

/// Timer-only mode: scheduled backups without a change watcher
async fn timer_loop(invoker: &OuterInvoker<'_, dyn Environment + '_>, secs: u64) -> Result<()> {
    let mut timer = tokio::time::interval(Duration::from_secs(secs));
    timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    info!("timer mode, backup every {}s, stop with ctrl-c", secs);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("termination signal received, shutting down");
                break;
            }
            _ = timer.tick() => trigger(invoker),
        }
    }

    Ok(())
}

/// One triggered run; failures are logged and the loop carries on, the
/// next eligible trigger attempts a fresh run
fn trigger(invoker: &OuterInvoker<'_, dyn Environment + '_>) {
    match invoker.trigger_backup() {
        Ok(BackupOutcome::Success { directory }) => {
            info!("backup verified: {}", directory.display());
        }
        Ok(BackupOutcome::Failure { reason }) => {
            error!("backup failed: {}", reason);
        }
        Err(e) => {
            error!("backup could not be triggered: {:#}", e);
        }
    }
}

/// Resolves on SIGINT or SIGTERM
async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res,
            _ = term.recv() => Ok(()),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}
