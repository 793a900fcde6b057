//! File system watching for Flowvault
//!
//! This crate provides:
//! - A recursive change watcher with a supervised restart policy
//! - The debounce coordinator that rate-limits backup triggers

pub mod debounce;
pub mod watch;

// Re-exports
pub use debounce::{Clock, DebounceDecision, Debouncer, SystemClock};
pub use watch::{ChangeSignal, ChangeWatcher};
