//! PageSnap Store - SQLite persistence and routing config
//!
//! Provides:
//! - SQLite schema with migrations framework
//! - `SqliteStore`, implementing the page, snapshot and site ports with
//!   savepoint-based units of work
//! - Routing config (route catalog) parser

pub mod catalog;
pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

// Re-export key types
pub use catalog::{parse_routing_file, parse_routing_str, RoutingConfigV0};
pub use errors::Result;
pub use repo::SqliteStore;
