//! Administrative snapshot operations
//!
//! Writes made here notify the cache: every created or updated snapshot
//! invalidates the cached artifacts of its page. Invalidation is best
//! effort and runs after the write is committed; its failures are logged
//! and never fail the write.

use chrono::Utc;

use crate::cache::{page_keys, CacheManager};
use crate::errors::{ExError, Result};
use crate::model::{SiteId, Snapshot, SnapshotId};
use crate::ops::ports::SnapshotManager;
use crate::ops::unit_of_work::{in_transaction, UnitOfWork};

/// Snapshot admin surface with an optional cache
#[derive(Default, Clone, Copy)]
pub struct SnapshotAdmin<'c> {
    cache: Option<&'c dyn CacheManager>,
}

impl<'c> SnapshotAdmin<'c> {
    pub fn new(cache: Option<&'c dyn CacheManager>) -> Self {
        Self { cache }
    }

    pub fn with_cache(cache: &'c dyn CacheManager) -> Self {
        Self { cache: Some(cache) }
    }

    pub fn has_cache(&self) -> bool {
        self.cache.is_some()
    }

    /// Persist a new snapshot
    ///
    /// An enabled snapshot goes through activation so that it becomes the
    /// only enabled snapshot of its page.
    ///
    /// # Errors
    ///
    /// Returns store failures; the cache is not touched then.
    pub fn create<M>(&self, manager: &mut M, snapshot: &mut Snapshot) -> Result<()>
    where
        M: SnapshotManager + UnitOfWork + ?Sized,
    {
        in_transaction(manager, |manager| write(manager, snapshot, false))?;
        self.post_persist(snapshot);
        Ok(())
    }

    /// Persist changes to an existing snapshot
    ///
    /// # Errors
    ///
    /// Returns store failures; the cache is not touched then.
    pub fn update<M>(&self, manager: &mut M, snapshot: &mut Snapshot) -> Result<()>
    where
        M: SnapshotManager + UnitOfWork + ?Sized,
    {
        in_transaction(manager, |manager| {
            let was_enabled = match snapshot.id {
                Some(id) => manager.find_snapshot(id)?.map_or(false, |s| s.enabled),
                None => false,
            };
            write(manager, snapshot, was_enabled)
        })?;
        self.post_update(snapshot);
        Ok(())
    }

    pub fn post_persist(&self, snapshot: &Snapshot) {
        self.invalidate_page(snapshot, "post_persist");
    }

    pub fn post_update(&self, snapshot: &Snapshot) {
        self.invalidate_page(snapshot, "post_update");
    }

    /// Flip the enabled flag of each listed snapshot
    ///
    /// Enabling disables the page's other snapshots. Unknown ids are skipped.
    /// All toggles commit together; the cache is notified afterwards. The
    /// returned snapshots reflect the stored state once every toggle ran.
    ///
    /// # Errors
    ///
    /// Returns store failures after rolling back every toggle.
    pub fn batch_toggle_enabled<M>(
        &self,
        manager: &mut M,
        ids: &[SnapshotId],
    ) -> Result<Vec<Snapshot>>
    where
        M: SnapshotManager + UnitOfWork + ?Sized,
    {
        let toggled = in_transaction(manager, |manager| {
            let at = Utc::now();
            let mut touched = Vec::with_capacity(ids.len());
            for id in ids {
                let Some(mut snapshot) = manager.find_snapshot(*id)? else {
                    tracing::debug!(snapshot_id = *id, "toggle skipped unknown snapshot");
                    continue;
                };
                if snapshot.enabled {
                    manager.disable_snapshot(&mut snapshot, at)?;
                } else {
                    manager.enable_snapshots(std::slice::from_mut(&mut snapshot), at)?;
                }
                touched.push(*id);
            }

            // A later toggle may have disabled an earlier one on the same page
            let mut toggled = Vec::with_capacity(touched.len());
            for id in touched {
                if let Some(snapshot) = manager.find_snapshot(id)? {
                    toggled.push(snapshot);
                }
            }
            Ok(toggled)
        })?;

        for snapshot in &toggled {
            self.post_update(snapshot);
        }
        Ok(toggled)
    }

    /// Snapshots whose route name contains `route_filter`
    ///
    /// # Errors
    ///
    /// Returns store failures.
    pub fn list<M>(
        &self,
        manager: &M,
        site_id: Option<SiteId>,
        route_filter: Option<&str>,
    ) -> Result<Vec<Snapshot>>
    where
        M: SnapshotManager + ?Sized,
    {
        manager.find_by_route_name(site_id, route_filter.filter(|f| !f.is_empty()))
    }

    fn invalidate_page(&self, snapshot: &Snapshot, hook: &'static str) {
        let Some(cache) = self.cache else {
            return;
        };
        if let Err(err) = cache.invalidate(&page_keys(snapshot.page_id)) {
            let ex: ExError = err.into();
            tracing::warn!(
                component = module_path!(),
                op = hook,
                page_id = snapshot.page_id,
                err_code = ex.code(),
                error = %ex,
                "cache invalidation failed"
            );
        }
    }
}

fn write<M>(manager: &mut M, snapshot: &mut Snapshot, was_enabled: bool) -> Result<()>
where
    M: SnapshotManager + ?Sized,
{
    if snapshot.enabled && !was_enabled {
        snapshot.enabled = false;
        manager.save_snapshot(snapshot)?;
        manager.enable_snapshots(std::slice::from_mut(snapshot), Utc::now())
    } else {
        manager.save_snapshot(snapshot)
    }
}
