#![allow(dead_code)]

use std::cell::Cell;

use chrono::{DateTime, Utc};
use pagesnap_core::errors::{PageSnapError, Result};
use pagesnap_core::model::{
    Page, PageId, Route, RouteCollection, Site, SiteId, Snapshot, SnapshotId,
};
use pagesnap_core::ops::{
    MemoryStore, PageCriteria, PageStore, SiteStore, SnapshotManager, UnitOfWork,
};

/// Store holding one saved site
pub fn store_with_site(name: &str, host: &str) -> (MemoryStore, Site) {
    let mut store = MemoryStore::new();
    let mut site = Site::new(name, host);
    store.save_site(&mut site).unwrap();
    (store, site)
}

/// Save a page and return it with its id
pub fn save_page(store: &mut MemoryStore, mut page: Page) -> Page {
    store.save_page(&mut page).unwrap();
    page
}

/// Routing table of the multi-host scenario
pub fn scenario_routes() -> RouteCollection {
    let mut routes = RouteCollection::new();
    routes.add("route1", Route::new("/first_custom_route"));
    routes.add("route2", Route::new("/second_custom_route"));
    routes.add(
        "test_hybrid_page_with_good_host",
        Route::new("/third_custom_route")
            .with_host("sonata-project.{tld}")
            .with_requirement("tld", "fr|org"),
    );
    routes.add(
        "test_hybrid_page_with_bad_host",
        Route::new("/fourth_custom_route").with_host("sonata-project.com"),
    );
    routes
}

/// Page store answering from a fixed script
///
/// `find_one_by` only resolves the pages listed in `resolvable`;
/// `get_hybrid_pages` returns every scripted hybrid page; writes are
/// recorded and assigned fresh ids.
pub struct ScriptedPageStore {
    pub hybrid_pages: Vec<Page>,
    pub resolvable: Vec<String>,
    pub saved: Vec<Page>,
    pub deleted: Vec<Page>,
    next_id: PageId,
}

impl ScriptedPageStore {
    pub fn new(site_id: SiteId, hybrid_routes: &[&str], resolvable: &[&str]) -> Self {
        let hybrid_pages = hybrid_routes
            .iter()
            .enumerate()
            .map(|(index, route)| {
                let mut page = Page::new(site_id, *route);
                page.id = Some(100 + index as PageId);
                page
            })
            .collect();
        Self {
            hybrid_pages,
            resolvable: resolvable.iter().map(|r| r.to_string()).collect(),
            saved: Vec::new(),
            deleted: Vec::new(),
            next_id: 1,
        }
    }
}

impl PageStore for ScriptedPageStore {
    fn find_by(&self, criteria: &PageCriteria) -> Result<Vec<Page>> {
        Ok(self
            .hybrid_pages
            .iter()
            .filter(|p| self.resolvable.contains(&p.route_name) && criteria.matches(p))
            .cloned()
            .collect())
    }

    fn find_page(&self, page_id: PageId) -> Result<Option<Page>> {
        Ok(self.hybrid_pages.iter().find(|p| p.id == Some(page_id)).cloned())
    }

    fn get_page_by_url(&self, _site: &Site, _url: &str) -> Result<Option<Page>> {
        Ok(None)
    }

    fn get_hybrid_pages(&self, _site: &Site) -> Result<Vec<Page>> {
        Ok(self.hybrid_pages.clone())
    }

    fn save_page(&mut self, page: &mut Page) -> Result<()> {
        if page.id.is_none() {
            page.id = Some(self.next_id);
            self.next_id += 1;
        }
        self.saved.push(page.clone());
        Ok(())
    }

    fn delete_page(&mut self, page: &Page) -> Result<()> {
        self.deleted.push(page.clone());
        Ok(())
    }
}

/// Memory store whose `save_snapshot` fails on the n-th call (1-based)
pub struct FailingStore {
    pub inner: MemoryStore,
    fail_on: usize,
    calls: Cell<usize>,
}

impl FailingStore {
    pub fn new(inner: MemoryStore, fail_on: usize) -> Self {
        Self {
            inner,
            fail_on,
            calls: Cell::new(0),
        }
    }
}

impl PageStore for FailingStore {
    fn find_by(&self, criteria: &PageCriteria) -> Result<Vec<Page>> {
        self.inner.find_by(criteria)
    }

    fn find_page(&self, page_id: PageId) -> Result<Option<Page>> {
        self.inner.find_page(page_id)
    }

    fn save_page(&mut self, page: &mut Page) -> Result<()> {
        self.inner.save_page(page)
    }

    fn delete_page(&mut self, page: &Page) -> Result<()> {
        self.inner.delete_page(page)
    }
}

impl SnapshotManager for FailingStore {
    fn save_snapshot(&mut self, snapshot: &mut Snapshot) -> Result<()> {
        let call = self.calls.get() + 1;
        self.calls.set(call);
        if call == self.fail_on {
            return Err(PageSnapError::persistence(
                "save_snapshot",
                format!("injected failure on call {}", call),
            ));
        }
        self.inner.save_snapshot(snapshot)
    }

    fn enable_snapshots(&mut self, snapshots: &mut [Snapshot], at: DateTime<Utc>) -> Result<()> {
        self.inner.enable_snapshots(snapshots, at)
    }

    fn disable_snapshot(&mut self, snapshot: &mut Snapshot, at: DateTime<Utc>) -> Result<()> {
        self.inner.disable_snapshot(snapshot, at)
    }

    fn find_snapshot(&self, snapshot_id: SnapshotId) -> Result<Option<Snapshot>> {
        self.inner.find_snapshot(snapshot_id)
    }

    fn find_enabled_snapshot(&self, page_id: PageId) -> Result<Option<Snapshot>> {
        self.inner.find_enabled_snapshot(page_id)
    }

    fn find_enabled_children(&self, page_id: PageId) -> Result<Vec<Snapshot>> {
        self.inner.find_enabled_children(page_id)
    }

    fn find_snapshots_by_page(&self, page_id: PageId) -> Result<Vec<Snapshot>> {
        self.inner.find_snapshots_by_page(page_id)
    }

    fn find_by_route_name(
        &self,
        site_id: Option<SiteId>,
        route_filter: Option<&str>,
    ) -> Result<Vec<Snapshot>> {
        self.inner.find_by_route_name(site_id, route_filter)
    }
}

impl UnitOfWork for FailingStore {
    fn begin(&mut self) -> Result<()> {
        self.inner.begin()
    }

    fn commit(&mut self) -> Result<()> {
        self.inner.commit()
    }

    fn rollback(&mut self) -> Result<()> {
        self.inner.rollback()
    }

    fn depth(&self) -> usize {
        self.inner.depth()
    }
}
