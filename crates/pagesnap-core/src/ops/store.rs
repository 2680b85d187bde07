use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::errors::{PageSnapError, Result};
use crate::model::{Page, PageId, Site, SiteId, Snapshot, SnapshotId};
use crate::ops::ports::{PageCriteria, PageStore, SiteStore, SnapshotManager};
use crate::ops::unit_of_work::UnitOfWork;

#[derive(Debug, Clone, Default)]
struct MemoryState {
    sites: BTreeMap<SiteId, Site>,
    pages: BTreeMap<PageId, Page>,
    snapshots: BTreeMap<SnapshotId, Snapshot>,
    next_site_id: SiteId,
    next_page_id: PageId,
    next_snapshot_id: SnapshotId,
}

/// In-memory store implementing every persistence port
///
/// Enforces the same invariants as the SQLite schema (one hybrid page per
/// route and site, one enabled snapshot per page, same-site parents).
/// Units of work keep a stack of state copies: `begin` pushes, `commit`
/// drops the copy, `rollback` restores it.
/// Not thread-safe; designed for tests and single-threaded tools.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: MemoryState,
    savepoints: Vec<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_count(&self) -> usize {
        self.state.pages.len()
    }

    pub fn snapshot_count(&self) -> usize {
        self.state.snapshots.len()
    }

    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.state.pages.values()
    }

    pub fn snapshots(&self) -> impl Iterator<Item = &Snapshot> {
        self.state.snapshots.values()
    }

    fn check_page_invariants(&self, page: &Page) -> Result<()> {
        if page.is_hybrid() {
            let clash = self.state.pages.values().any(|other| {
                other.id != page.id
                    && other.site_id == page.site_id
                    && other.route_name == page.route_name
            });
            if clash {
                return Err(PageSnapError::DuplicateRoute {
                    site_id: page.site_id,
                    route_name: page.route_name.clone(),
                });
            }
        }

        if let Some(parent_id) = page.parent_id {
            let parent = self
                .state
                .pages
                .get(&parent_id)
                .ok_or(PageSnapError::PageNotFound { page_id: parent_id })?;
            if parent.site_id != page.site_id {
                return Err(PageSnapError::ParentSiteMismatch {
                    page_id: page.id.unwrap_or_default(),
                    page_site_id: page.site_id,
                    parent_id,
                    parent_site_id: parent.site_id,
                });
            }
        }
        Ok(())
    }
}

impl PageStore for MemoryStore {
    fn find_by(&self, criteria: &PageCriteria) -> Result<Vec<Page>> {
        Ok(self
            .state
            .pages
            .values()
            .filter(|page| criteria.matches(page))
            .cloned()
            .collect())
    }

    fn find_page(&self, page_id: PageId) -> Result<Option<Page>> {
        Ok(self.state.pages.get(&page_id).cloned())
    }

    fn save_page(&mut self, page: &mut Page) -> Result<()> {
        self.check_page_invariants(page)?;

        let id = match page.id {
            Some(id) => id,
            None => {
                self.state.next_page_id += 1;
                self.state.next_page_id
            }
        };
        page.id = Some(id);
        page.touch();
        self.state.pages.insert(id, page.clone());
        Ok(())
    }

    fn delete_page(&mut self, page: &Page) -> Result<()> {
        let Some(page_id) = page.id else {
            return Err(PageSnapError::PageNotPersisted {
                route_name: page.route_name.clone(),
            });
        };
        if self.state.pages.remove(&page_id).is_none() {
            return Err(PageSnapError::PageNotFound { page_id });
        }
        // Orphaned children move to the root level; their snapshots go with the page
        for child in self.state.pages.values_mut() {
            if child.parent_id == Some(page_id) {
                child.parent_id = None;
            }
        }
        self.state.snapshots.retain(|_, s| s.page_id != page_id);
        Ok(())
    }
}

impl SnapshotManager for MemoryStore {
    fn save_snapshot(&mut self, snapshot: &mut Snapshot) -> Result<()> {
        if !self.state.pages.contains_key(&snapshot.page_id) {
            return Err(PageSnapError::PageNotFound {
                page_id: snapshot.page_id,
            });
        }
        if snapshot.enabled {
            let clash = self.state.snapshots.values().any(|other| {
                other.id != snapshot.id && other.page_id == snapshot.page_id && other.enabled
            });
            if clash {
                return Err(PageSnapError::persistence(
                    "save_snapshot",
                    format!(
                        "page {} already has an enabled snapshot",
                        snapshot.page_id
                    ),
                ));
            }
        }

        let id = match snapshot.id {
            Some(id) => id,
            None => {
                self.state.next_snapshot_id += 1;
                self.state.next_snapshot_id
            }
        };
        snapshot.id = Some(id);
        self.state.snapshots.insert(id, snapshot.clone());
        Ok(())
    }

    fn enable_snapshots(&mut self, snapshots: &mut [Snapshot], at: DateTime<Utc>) -> Result<()> {
        // Validate everything first so a bad entry leaves no partial activation
        for snapshot in snapshots.iter() {
            let id = snapshot.id.ok_or(PageSnapError::SnapshotNotPersisted {
                page_id: snapshot.page_id,
            })?;
            if !self.state.snapshots.contains_key(&id) {
                return Err(PageSnapError::SnapshotNotFound { snapshot_id: id });
            }
        }

        for snapshot in snapshots.iter_mut() {
            for other in self.state.snapshots.values_mut() {
                if other.page_id == snapshot.page_id && other.id != snapshot.id && other.enabled {
                    other.enabled = false;
                    if other.publication_date_end.is_none() {
                        other.publication_date_end = Some(at);
                    }
                }
            }
            snapshot.enabled = true;
            snapshot.publication_date_start = Some(at);
            snapshot.publication_date_end = None;
            if let Some(id) = snapshot.id {
                self.state.snapshots.insert(id, snapshot.clone());
            }
        }

        // A later entry for the same page supersedes an earlier one
        for snapshot in snapshots.iter_mut() {
            if let Some(stored) = snapshot.id.and_then(|id| self.state.snapshots.get(&id)) {
                *snapshot = stored.clone();
            }
        }
        Ok(())
    }

    fn disable_snapshot(&mut self, snapshot: &mut Snapshot, at: DateTime<Utc>) -> Result<()> {
        let id = snapshot.id.ok_or(PageSnapError::SnapshotNotPersisted {
            page_id: snapshot.page_id,
        })?;
        let stored = self
            .state
            .snapshots
            .get_mut(&id)
            .ok_or(PageSnapError::SnapshotNotFound { snapshot_id: id })?;
        stored.enabled = false;
        if stored.publication_date_end.is_none() {
            stored.publication_date_end = Some(at);
        }
        *snapshot = stored.clone();
        Ok(())
    }

    fn find_snapshot(&self, snapshot_id: SnapshotId) -> Result<Option<Snapshot>> {
        Ok(self.state.snapshots.get(&snapshot_id).cloned())
    }

    fn find_enabled_snapshot(&self, page_id: PageId) -> Result<Option<Snapshot>> {
        Ok(self
            .state
            .snapshots
            .values()
            .find(|s| s.page_id == page_id && s.enabled)
            .cloned())
    }

    fn find_enabled_children(&self, page_id: PageId) -> Result<Vec<Snapshot>> {
        let mut children: Vec<Snapshot> = self
            .state
            .snapshots
            .values()
            .filter(|s| s.parent_id == Some(page_id) && s.enabled)
            .cloned()
            .collect();
        children.sort_by_key(|s| (s.content.position, s.page_id));
        Ok(children)
    }

    fn find_snapshots_by_page(&self, page_id: PageId) -> Result<Vec<Snapshot>> {
        Ok(self
            .state
            .snapshots
            .values()
            .filter(|s| s.page_id == page_id)
            .cloned()
            .collect())
    }

    fn find_by_route_name(
        &self,
        site_id: Option<SiteId>,
        route_filter: Option<&str>,
    ) -> Result<Vec<Snapshot>> {
        Ok(self
            .state
            .snapshots
            .values()
            .filter(|s| site_id.map_or(true, |id| s.site_id == id))
            .filter(|s| route_filter.map_or(true, |f| s.route_name.contains(f)))
            .cloned()
            .collect())
    }
}

impl SiteStore for MemoryStore {
    fn save_site(&mut self, site: &mut Site) -> Result<()> {
        let id = match site.id {
            Some(id) => id,
            None => {
                self.state.next_site_id += 1;
                self.state.next_site_id
            }
        };
        site.id = Some(id);
        self.state.sites.insert(id, site.clone());
        Ok(())
    }

    fn find_site(&self, site_id: SiteId) -> Result<Option<Site>> {
        Ok(self.state.sites.get(&site_id).cloned())
    }

    fn list_sites(&self) -> Result<Vec<Site>> {
        Ok(self.state.sites.values().cloned().collect())
    }
}

impl UnitOfWork for MemoryStore {
    fn begin(&mut self) -> Result<()> {
        self.savepoints.push(self.state.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.savepoints
            .pop()
            .map(|_| ())
            .ok_or_else(|| PageSnapError::UnitOfWork {
                message: "commit without begin".to_string(),
            })
    }

    fn rollback(&mut self) -> Result<()> {
        let saved = self
            .savepoints
            .pop()
            .ok_or_else(|| PageSnapError::UnitOfWork {
                message: "rollback without begin".to_string(),
            })?;
        self.state = saved;
        Ok(())
    }

    fn depth(&self) -> usize {
        self.savepoints.len()
    }
}
