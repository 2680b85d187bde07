//! Command orchestration layer.
//!
//! Each command opens a `SqliteStore` over the caller's connection, runs
//! the core operation inside a unit of work and logs its boundaries.

pub mod engine_command;
pub mod publish;
pub mod reconcile;
pub mod site;
