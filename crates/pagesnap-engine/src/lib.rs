//! PageSnap Engine - Orchestration layer
//!
//! Runs route reconciliation and snapshot publication against a SQLite
//! database, one unit of work per site.

pub mod commands;
