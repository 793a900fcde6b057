//! Debounce coordinator
//!
//! Leading-edge-then-cooldown: the first eligible change signal triggers
//! a backup synchronously; signals arriving inside the cooldown window
//! are discarded. The window is measured from when the previous triggered
//! run *finished*, not from the last suppressed signal, so a long-running
//! backup extends the effective cooldown. Under a sustained change stream
//! this produces runs spaced `min_interval + run_duration` apart, which
//! bounds backup frequency independent of backup duration.

use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Time source, injectable so tests can drive the clock
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Outcome of one change signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceDecision {
    /// The trigger ran to completion (successfully or not)
    Triggered,
    /// Signal discarded; the cooldown window had this much left
    Suppressed { remaining: Duration },
}

/// Debounce state for one watcher loop
///
/// Owned by the loop rather than living in process-global state, so the
/// cooldown logic is testable in isolation.
pub struct Debouncer<C: Clock = SystemClock> {
    min_interval: Duration,
    /// Completion time of the last triggered run. Updated whether the
    /// run succeeded or failed; failed runs consume cooldown too.
    last_trigger: Option<Instant>,
    clock: C,
}

impl Debouncer<SystemClock> {
    pub fn new(min_interval: Duration) -> Self {
        Self::with_clock(min_interval, SystemClock)
    }
}

impl<C: Clock> Debouncer<C> {
    pub fn with_clock(min_interval: Duration, clock: C) -> Self {
        Self {
            min_interval,
            last_trigger: None,
            clock,
        }
    }

    /// Handle one change signal
    ///
    /// Invokes `run` synchronously when the cooldown has elapsed (or no
    /// run has happened yet), then restarts the cooldown from the moment
    /// `run` returns.
    pub fn on_change_signal<F>(&mut self, run: F) -> DebounceDecision
    where
        F: FnOnce(),
    {
        let now = self.clock.now();

        if let Some(last) = self.last_trigger {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.min_interval {
                let remaining = self.min_interval - elapsed;
                info!(
                    "change signal suppressed, {}s of cooldown remaining",
                    remaining.as_secs()
                );
                return DebounceDecision::Suppressed { remaining };
            }
        }

        debug!("change signal eligible, triggering backup");
        run();

        // Cooldown restarts from completion, not from the signal
        self.last_trigger = Some(self.clock.now());
        DebounceDecision::Triggered
    }
}
