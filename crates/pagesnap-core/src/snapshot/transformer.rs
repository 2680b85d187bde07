//! Page ⇄ snapshot transformation
//!
//! A snapshot carries a self-contained copy of the page fields and its block
//! tree. Child pages are referenced, not embedded: each child is published
//! through its own snapshot and resolved at read time.

use chrono::{DateTime, Utc};

use crate::errors::{PageSnapError, Result};
use crate::model::{ChildRef, Page, Snapshot, SnapshotContent};

/// Builds snapshots from pages and pages back from snapshots
pub trait Transformer {
    /// Snapshot of `page` taken at `at`, not yet persisted nor enabled
    ///
    /// # Errors
    ///
    /// Fails with `PageNotPersisted` when the page has no id.
    fn create(&self, page: &Page, children: &[Page], at: DateTime<Utc>) -> Result<Snapshot>;

    /// Page view rebuilt from a snapshot's content
    fn load(&self, snapshot: &Snapshot) -> Page;
}

/// Default transformer copying the page and its block tree verbatim
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotTransformer;

impl Transformer for SnapshotTransformer {
    fn create(&self, page: &Page, children: &[Page], at: DateTime<Utc>) -> Result<Snapshot> {
        let page_id = page.id.ok_or_else(|| PageSnapError::PageNotPersisted {
            route_name: page.route_name.clone(),
        })?;

        let mut child_refs = Vec::with_capacity(children.len());
        for child in children {
            let child_id = child.id.ok_or_else(|| PageSnapError::PageNotPersisted {
                route_name: child.route_name.clone(),
            })?;
            child_refs.push(ChildRef {
                page_id: child_id,
                route_name: child.route_name.clone(),
                url: child.url.clone(),
                position: child.position,
            });
        }
        child_refs.sort_by_key(|c| (c.position, c.page_id));

        let mut blocks = page.blocks.clone();
        blocks.sort_by_key(|b| b.position);

        let content = SnapshotContent {
            page_id,
            site_id: page.site_id,
            parent_id: page.parent_id,
            route_name: page.route_name.clone(),
            name: page.name.clone(),
            url: page.url.clone(),
            slug: page.slug.clone(),
            request_method: page.request_method.clone(),
            enabled: page.enabled,
            decorate: page.decorate,
            position: page.position,
            page_created_at: page.created_at,
            page_updated_at: page.updated_at,
            blocks,
            children: child_refs,
        };

        Ok(Snapshot {
            id: None,
            page_id,
            site_id: page.site_id,
            parent_id: page.parent_id,
            route_name: page.route_name.clone(),
            url: page.url.clone(),
            name: page.name.clone(),
            enabled: false,
            publication_date_start: None,
            publication_date_end: None,
            content,
            created_at: at,
        })
    }

    fn load(&self, snapshot: &Snapshot) -> Page {
        let content = &snapshot.content;
        Page {
            id: Some(content.page_id),
            site_id: content.site_id,
            parent_id: content.parent_id,
            route_name: content.route_name.clone(),
            name: content.name.clone(),
            url: content.url.clone(),
            slug: content.slug.clone(),
            request_method: content.request_method.clone(),
            enabled: content.enabled,
            edited: false,
            decorate: content.decorate,
            position: content.position,
            blocks: content.blocks.clone(),
            created_at: content.page_created_at,
            updated_at: content.page_updated_at,
        }
    }
}
