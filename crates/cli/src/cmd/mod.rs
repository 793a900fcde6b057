//! CLI command implementations

pub mod config;
pub mod orchestrate;
pub mod prune;
pub mod run;
pub mod status;
pub mod watch;
