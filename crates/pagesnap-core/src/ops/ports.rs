//! Persistence and collaborator ports
//!
//! The reconciler and the snapshot pipeline only talk to storage through
//! these traits. `MemoryStore` implements them in this crate; the SQLite
//! implementation lives in `pagesnap-store`.

use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::model::{Page, PageId, RouteCollection, Site, SiteId, Snapshot, SnapshotId};

/// Source of the process-wide routing table
pub trait RouteCatalog {
    /// Current routes in declaration order
    fn route_collection(&self) -> Result<RouteCollection>;
}

impl RouteCatalog for RouteCollection {
    fn route_collection(&self) -> Result<RouteCollection> {
        Ok(self.clone())
    }
}

/// Conjunctive filter over pages; unset fields match anything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageCriteria {
    pub site_id: Option<SiteId>,
    pub route_name: Option<String>,
    pub url: Option<String>,
    pub parent_id: Option<PageId>,
    pub edited: Option<bool>,
}

impl PageCriteria {
    pub fn site(site_id: SiteId) -> Self {
        Self {
            site_id: Some(site_id),
            ..Self::default()
        }
    }

    pub fn route(site_id: SiteId, route_name: impl Into<String>) -> Self {
        Self {
            site_id: Some(site_id),
            route_name: Some(route_name.into()),
            ..Self::default()
        }
    }

    pub fn url(site_id: SiteId, url: impl Into<String>) -> Self {
        Self {
            site_id: Some(site_id),
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn children_of(parent_id: PageId) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, page: &Page) -> bool {
        self.site_id.map_or(true, |id| page.site_id == id)
            && self
                .route_name
                .as_deref()
                .map_or(true, |name| page.route_name == name)
            && self
                .url
                .as_deref()
                .map_or(true, |url| page.url.as_deref() == Some(url))
            && self
                .parent_id
                .map_or(true, |id| page.parent_id == Some(id))
            && self.edited.map_or(true, |edited| page.edited == edited)
    }
}

/// Page persistence
pub trait PageStore {
    /// New unsaved page with default flags
    fn create(&self) -> Page {
        Page::default()
    }

    /// Pages matching the criteria, in id order
    fn find_by(&self, criteria: &PageCriteria) -> Result<Vec<Page>>;

    fn find_one_by(&self, criteria: &PageCriteria) -> Result<Option<Page>> {
        Ok(self.find_by(criteria)?.into_iter().next())
    }

    fn find_page(&self, page_id: PageId) -> Result<Option<Page>>;

    fn get_page_by_url(&self, site: &Site, url: &str) -> Result<Option<Page>> {
        match site.id {
            Some(site_id) => self.find_one_by(&PageCriteria::url(site_id, url)),
            None => Ok(None),
        }
    }

    /// Pages of the site bound to a route other than the CMS route
    fn get_hybrid_pages(&self, site: &Site) -> Result<Vec<Page>> {
        let Some(site_id) = site.id else {
            return Ok(Vec::new());
        };
        Ok(self
            .find_by(&PageCriteria::site(site_id))?
            .into_iter()
            .filter(Page::is_hybrid)
            .collect())
    }

    /// Insert or update; assigns `page.id` on first save
    fn save_page(&mut self, page: &mut Page) -> Result<()>;

    fn delete_page(&mut self, page: &Page) -> Result<()>;
}

/// Snapshot persistence and activation
pub trait SnapshotManager {
    /// Insert or update; assigns `snapshot.id` on first save
    fn save_snapshot(&mut self, snapshot: &mut Snapshot) -> Result<()>;

    /// Enable the given snapshots as of `at`
    ///
    /// Every other enabled snapshot of the same pages is disabled and its
    /// publication window closed at `at`, in the same atomic step.
    fn enable_snapshots(&mut self, snapshots: &mut [Snapshot], at: DateTime<Utc>) -> Result<()>;

    /// Disable one snapshot, closing its publication window at `at`
    fn disable_snapshot(&mut self, snapshot: &mut Snapshot, at: DateTime<Utc>) -> Result<()>;

    fn find_snapshot(&self, snapshot_id: SnapshotId) -> Result<Option<Snapshot>>;

    fn find_enabled_snapshot(&self, page_id: PageId) -> Result<Option<Snapshot>>;

    /// Enabled snapshots whose parent is the given page
    fn find_enabled_children(&self, page_id: PageId) -> Result<Vec<Snapshot>>;

    /// All snapshots of a page, oldest first
    fn find_snapshots_by_page(&self, page_id: PageId) -> Result<Vec<Snapshot>>;

    /// Snapshots of a site whose route name contains `route_filter`
    fn find_by_route_name(
        &self,
        site_id: Option<SiteId>,
        route_filter: Option<&str>,
    ) -> Result<Vec<Snapshot>>;
}

/// Site persistence
pub trait SiteStore {
    fn save_site(&mut self, site: &mut Site) -> Result<()>;

    fn find_site(&self, site_id: SiteId) -> Result<Option<Site>>;

    fn list_sites(&self) -> Result<Vec<Site>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_criteria_matching() {
        let page = Page::new(1, "route1").with_url("/first").with_parent(9);

        assert!(PageCriteria::site(1).matches(&page));
        assert!(!PageCriteria::site(2).matches(&page));
        assert!(PageCriteria::route(1, "route1").matches(&page));
        assert!(!PageCriteria::route(1, "route2").matches(&page));
        assert!(PageCriteria::url(1, "/first").matches(&page));
        assert!(PageCriteria::children_of(9).matches(&page));
        assert!(PageCriteria::default().matches(&page));
    }
}
