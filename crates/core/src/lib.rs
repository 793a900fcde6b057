//! Core data model and configuration for Flowvault
//!
//! This crate provides:
//! - Snapshot run model and on-disk naming contract
//! - Error types shared across the workspace
//! - TOML configuration with defaults and validation

pub mod config;
pub mod error;
pub mod snapshot;

// Re-exports
pub use config::Config;
pub use error::BackupError;
pub use snapshot::{ArtifactKind, SnapshotRun, AUTO_BACKUP_DIR, VERIFIED_MARKER};
