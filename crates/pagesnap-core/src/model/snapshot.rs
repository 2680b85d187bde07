use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::block::Block;
use super::page::PageId;
use super::site::SiteId;

pub type SnapshotId = i64;

/// Immutable, publishable rendering of a page at a point in time
///
/// Snapshots are append-only: `content` never changes after creation.
/// Publication only toggles `enabled` and the publication window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: Option<SnapshotId>,
    pub page_id: PageId,
    pub site_id: SiteId,
    pub parent_id: Option<PageId>,
    pub route_name: String,
    pub url: Option<String>,
    pub name: String,

    /// At most one snapshot per page is enabled
    pub enabled: bool,
    pub publication_date_start: Option<DateTime<Utc>>,
    pub publication_date_end: Option<DateTime<Utc>>,
    pub content: SnapshotContent,
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    /// Whether this snapshot should be served at the given instant
    pub fn is_published_at(&self, at: DateTime<Utc>) -> bool {
        if !self.enabled {
            return false;
        }
        let started = self.publication_date_start.map_or(false, |start| start <= at);
        let not_ended = self.publication_date_end.map_or(true, |end| at < end);
        started && not_ended
    }
}

/// Self-contained page document stored inside a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotContent {
    pub page_id: PageId,
    pub site_id: SiteId,
    pub parent_id: Option<PageId>,
    pub route_name: String,
    pub name: String,
    pub url: Option<String>,
    pub slug: Option<String>,
    pub request_method: String,
    pub enabled: bool,
    pub decorate: bool,
    pub position: i32,
    pub page_created_at: DateTime<Utc>,
    pub page_updated_at: DateTime<Utc>,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub children: Vec<ChildRef>,
}

/// Reference to a child page, resolved through its own enabled snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRef {
    pub page_id: PageId,
    pub route_name: String,
    pub url: Option<String>,
    pub position: i32,
}
