//! Snapshot creation service
//!
//! Publishes pages: each page gets a fresh snapshot which becomes the only
//! enabled snapshot of that page. A whole-site publish runs in one unit of
//! work, so either every page is published or none is.

use std::time::Instant;

use chrono::Utc;

use crate::errors::{PageSnapError, Result};
use crate::model::{Page, Site, Snapshot};
use crate::ops::ports::{PageCriteria, PageStore, SnapshotManager};
use crate::ops::unit_of_work::{in_transaction, UnitOfWork};
use crate::snapshot::transformer::{SnapshotTransformer, Transformer};
use crate::{log_op_end, log_op_error, log_op_start};

/// Store capabilities needed to publish pages
pub trait PublishStore: PageStore + SnapshotManager + UnitOfWork {}

impl<T: PageStore + SnapshotManager + UnitOfWork + ?Sized> PublishStore for T {}

pub struct CreateSnapshotService<T = SnapshotTransformer> {
    transformer: T,
}

impl Default for CreateSnapshotService<SnapshotTransformer> {
    fn default() -> Self {
        Self::new(SnapshotTransformer)
    }
}

impl<T: Transformer> CreateSnapshotService<T> {
    pub fn new(transformer: T) -> Self {
        Self { transformer }
    }

    pub fn transformer(&self) -> &T {
        &self.transformer
    }

    /// Snapshot one page and make it the page's only enabled snapshot
    ///
    /// The page is marked as no longer edited. Runs in its own unit of work,
    /// nested in the caller's when one is open.
    ///
    /// # Errors
    ///
    /// Propagates transformer and store failures; nothing is written then.
    pub fn create_by_page<S>(&self, store: &mut S, page: &Page) -> Result<Snapshot>
    where
        S: PublishStore + ?Sized,
    {
        let start = Instant::now();
        let page_id = page.id.ok_or_else(|| PageSnapError::PageNotPersisted {
            route_name: page.route_name.clone(),
        })?;
        log_op_start!("create_snapshot_by_page", page_id = page_id);

        let result = in_transaction(store, |store| {
            let at = Utc::now();
            let children = store.find_by(&PageCriteria::children_of(page_id))?;
            let mut snapshot = self.transformer.create(page, &children, at)?;

            let mut page = page.clone();
            page.edited = false;
            store.save_page(&mut page)?;

            store.save_snapshot(&mut snapshot)?;
            store.enable_snapshots(std::slice::from_mut(&mut snapshot), at)?;
            Ok(snapshot)
        });

        match result {
            Ok(snapshot) => {
                log_op_end!(
                    "create_snapshot_by_page",
                    duration_ms = start.elapsed().as_millis() as u64,
                    page_id = page_id,
                    snapshot_id = snapshot.id
                );
                Ok(snapshot)
            }
            Err(err) => {
                log_op_error!(
                    "create_snapshot_by_page",
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    page_id = page_id
                );
                Err(err)
            }
        }
    }

    /// Snapshot every page of the site in one unit of work
    ///
    /// # Errors
    ///
    /// Any failure rolls back every page of the site and is returned as-is.
    pub fn create_by_site<S>(&self, store: &mut S, site: &Site) -> Result<Vec<Snapshot>>
    where
        S: PublishStore + ?Sized,
    {
        let site_id = site.id.ok_or_else(|| PageSnapError::InvalidInput {
            reason: format!("site '{}' has not been persisted", site.name),
        })?;
        let start = Instant::now();
        log_op_start!("create_snapshot_by_site", site_id = site_id);

        let result = in_transaction(store, |store| {
            let pages = store.find_by(&PageCriteria::site(site_id))?;
            let mut snapshots = Vec::with_capacity(pages.len());
            for page in &pages {
                snapshots.push(self.create_by_page(store, page)?);
            }
            Ok(snapshots)
        });

        match result {
            Ok(snapshots) => {
                log_op_end!(
                    "create_snapshot_by_site",
                    duration_ms = start.elapsed().as_millis() as u64,
                    site_id = site_id,
                    page_count = snapshots.len()
                );
                Ok(snapshots)
            }
            Err(err) => {
                log_op_error!(
                    "create_snapshot_by_site",
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    site_id = site_id
                );
                Err(err)
            }
        }
    }
}
