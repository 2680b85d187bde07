//! Correlation types for tracking reconciliation and publish runs
//!
//! A run is one invocation of a site-level operation (a route
//! reconciliation pass or a site publish). Every log event emitted while the
//! run is active can carry its id, so the lines of one pass can be grouped.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single reconciliation or publish run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(String);

impl RunId {
    /// Generate a new RunId using UUIDv7 (time ordered)
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Correlation context for one run against one site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunContext {
    pub run_id: RunId,
    /// Site the run is scoped to (None for "all sites" runs)
    pub site_id: Option<i64>,
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            run_id: RunId::new(),
            site_id: None,
        }
    }

    /// Scope the context to a single site
    pub fn for_site(site_id: i64) -> Self {
        Self {
            site_id: Some(site_id),
            ..Self::new()
        }
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}
