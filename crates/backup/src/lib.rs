//! Backup orchestration for Flowvault
//!
//! This crate provides:
//! - The artifact exporter capability (external export commands)
//! - The backup orchestrator (timestamped, verified snapshot runs)
//! - The retention manager (age-based pruning of old runs)

pub mod exporter;
pub mod orchestrator;
pub mod retention;
pub mod verify;

// Re-exports
pub use exporter::{ArtifactExporter, CommandExporter};
pub use orchestrator::{current_username, Orchestrator};
pub use retention::{prune, PruneStats, RetentionPolicy};
pub use verify::verify_run;
