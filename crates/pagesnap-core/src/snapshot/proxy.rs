//! Lazy page views over published snapshots

use std::cell::OnceCell;

use crate::errors::Result;
use crate::model::{Page, Snapshot};
use crate::ops::ports::SnapshotManager;
use crate::snapshot::transformer::Transformer;

/// Page served from a snapshot
///
/// The page is rebuilt from the snapshot content on first access; children
/// are loaded from their own enabled snapshots on first access.
pub struct SnapshotPageProxy<'a, M: ?Sized, T> {
    manager: &'a M,
    transformer: &'a T,
    snapshot: Snapshot,
    page: OnceCell<Page>,
    children: OnceCell<Vec<SnapshotPageProxy<'a, M, T>>>,
}

impl<'a, M, T> SnapshotPageProxy<'a, M, T>
where
    M: SnapshotManager + ?Sized,
    T: Transformer,
{
    pub fn new(manager: &'a M, transformer: &'a T, snapshot: Snapshot) -> Self {
        Self {
            manager,
            transformer,
            snapshot,
            page: OnceCell::new(),
            children: OnceCell::new(),
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn page(&self) -> &Page {
        self.page.get_or_init(|| self.transformer.load(&self.snapshot))
    }

    pub fn is_page_loaded(&self) -> bool {
        self.page.get().is_some()
    }

    /// Child pages, ordered by position
    ///
    /// # Errors
    ///
    /// Returns store failures; a failed load is retried on the next call.
    pub fn children(&self) -> Result<&[SnapshotPageProxy<'a, M, T>]> {
        if let Some(children) = self.children.get() {
            return Ok(children.as_slice());
        }
        let loaded: Vec<_> = self
            .manager
            .find_enabled_children(self.snapshot.page_id)?
            .into_iter()
            .map(|child| SnapshotPageProxy::new(self.manager, self.transformer, child))
            .collect();
        Ok(self.children.get_or_init(|| loaded).as_slice())
    }
}

/// Creates snapshot page proxies bound to one manager and transformer
pub struct SnapshotPageProxyFactory<'a, M: ?Sized, T> {
    manager: &'a M,
    transformer: &'a T,
}

impl<'a, M, T> SnapshotPageProxyFactory<'a, M, T>
where
    M: SnapshotManager + ?Sized,
    T: Transformer,
{
    pub fn new(manager: &'a M, transformer: &'a T) -> Self {
        Self {
            manager,
            transformer,
        }
    }

    pub fn create(&self, snapshot: Snapshot) -> SnapshotPageProxy<'a, M, T> {
        SnapshotPageProxy::new(self.manager, self.transformer, snapshot)
    }

    /// Proxy for the enabled snapshot of a page, if any
    ///
    /// # Errors
    ///
    /// Returns store failures.
    pub fn for_page(&self, page_id: i64) -> Result<Option<SnapshotPageProxy<'a, M, T>>> {
        Ok(self
            .manager
            .find_enabled_snapshot(page_id)?
            .map(|snapshot| self.create(snapshot)))
    }
}
