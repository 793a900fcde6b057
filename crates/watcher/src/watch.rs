//! Recursive change watcher with a supervised restart policy
//!
//! Emits one [`ChangeSignal`] per batch of filesystem notifications
//! (modify, create, delete, move) under the watched root. No coalescing
//! happens here; the debounce coordinator owns rate limiting.
//!
//! If the notification backend fails or the watch stream ends, the
//! watcher logs, waits a fixed delay, and re-establishes the watch.
//! Retries are unbounded. The backend is owned by the watch session, so
//! dropping or aborting the task tears it down on every exit path.

use notify::{Event, EventKind, RecursiveMode, Watcher as _};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Delay before re-establishing a failed watch
const RESTART_DELAY: Duration = Duration::from_secs(5);

/// One batch of observed filesystem changes
#[derive(Debug, Clone)]
pub struct ChangeSignal {
    /// Paths named by the underlying notification batch
    pub paths: Vec<PathBuf>,
}

/// Recursive watcher over a single root directory
pub struct ChangeWatcher {
    root: PathBuf,
    restart_delay: Duration,
}

impl ChangeWatcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            restart_delay: RESTART_DELAY,
        }
    }

    #[cfg(test)]
    fn with_restart_delay(root: impl Into<PathBuf>, restart_delay: Duration) -> Self {
        Self {
            root: root.into(),
            restart_delay,
        }
    }

    /// Run the watch loop indefinitely, sending signals on `tx`
    ///
    /// Never returns under normal operation. Spawn it as a background
    /// task and abort the task to stop watching; the notify backend is
    /// released when the session is dropped.
    pub async fn run(self, tx: mpsc::Sender<ChangeSignal>) {
        loop {
            match self.watch_session(&tx).await {
                Ok(()) => {
                    warn!(
                        "watch stream for {} ended, restarting in {:?}",
                        self.root.display(),
                        self.restart_delay
                    );
                }
                Err(e) => {
                    warn!(
                        "watch backend for {} failed ({}), restarting in {:?}",
                        self.root.display(),
                        e,
                        self.restart_delay
                    );
                }
            }

            tokio::time::sleep(self.restart_delay).await;
        }
    }

    /// One watch session: lives until the backend reports an error or
    /// the event stream closes
    async fn watch_session(&self, tx: &mpsc::Sender<ChangeSignal>) -> anyhow::Result<()> {
        let (err_tx, mut err_rx) = mpsc::channel::<notify::Error>(1);
        let signal_tx = tx.clone();

        // Callback runs on the notify backend's own thread
        let mut backend = notify::recommended_watcher(move |res: notify::Result<Event>| {
            match res {
                Ok(event) if is_relevant(&event.kind) => {
                    let _ = signal_tx.blocking_send(ChangeSignal { paths: event.paths });
                }
                Ok(event) => {
                    debug!("ignoring event kind {:?}", event.kind);
                }
                Err(e) => {
                    let _ = err_tx.blocking_send(e);
                }
            }
        })?;

        backend.watch(&self.root, RecursiveMode::Recursive)?;
        info!("watching {} recursively", self.root.display());

        match err_rx.recv().await {
            Some(e) => Err(e.into()),
            // Error channel closed: the backend thread is gone
            None => Ok(()),
        }
    }
}

/// Modify, create, delete, and move events count as changes
fn is_relevant(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}
