//! Snapshot publication orchestration.

#![allow(clippy::result_large_err)]

use std::time::Instant;

use pagesnap_core::errors::ExError;
use pagesnap_core::model::{SiteId, Snapshot, SnapshotId};
use pagesnap_core::ops::SiteStore;
use pagesnap_core::snapshot::{CreateSnapshotService, SnapshotAdmin};
use pagesnap_core::{log_op_end, log_op_error, log_op_start};
use pagesnap_core_types::RunContext;
use pagesnap_store::errors::Result;
use pagesnap_store::SqliteStore;
use rusqlite::Connection;
use serde::Serialize;

use crate::commands::site::load_site;

/// Outcome of publishing one site.
#[derive(Debug, Clone, Serialize)]
pub struct PublishSummary {
    pub site_id: SiteId,
    pub site_name: String,
    pub snapshots: Vec<Snapshot>,
}

impl PublishSummary {
    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }
}

/// Snapshot every page of one site; all or nothing.
pub fn publish_site(conn: &Connection, site_id: SiteId) -> Result<PublishSummary> {
    let ctx = RunContext::for_site(site_id);
    let start = Instant::now();
    log_op_start!("engine_publish_site", site_id = site_id, run_id = %ctx.run_id);

    let result = load_site(conn, site_id).and_then(|site| {
        let mut store = SqliteStore::new(conn);
        let snapshots = CreateSnapshotService::default().create_by_site(&mut store, &site)?;
        Ok(PublishSummary {
            site_id,
            site_name: site.name,
            snapshots,
        })
    });

    match result {
        Ok(summary) => {
            log_op_end!(
                "engine_publish_site",
                duration_ms = start.elapsed().as_millis() as u64,
                site_id = site_id,
                run_id = %ctx.run_id,
                snapshot_count = summary.snapshot_count()
            );
            Ok(summary)
        }
        Err(err) => {
            let err = err.with_run_id(ctx.run_id.clone());
            log_op_error!(
                "engine_publish_site",
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                site_id = site_id,
                run_id = %ctx.run_id
            );
            Err(err)
        }
    }
}

/// Publish every registered site, in id order.
///
/// Stops at the first failing site; earlier sites stay published.
pub fn publish_all(conn: &Connection) -> Result<Vec<PublishSummary>> {
    let sites = SqliteStore::new(conn)
        .list_sites()
        .map_err(ExError::from)?;
    sites
        .iter()
        .filter_map(|site| site.id)
        .map(|site_id| publish_site(conn, site_id))
        .collect()
}

/// Flip the enabled flag of the given snapshots.
pub fn toggle_snapshots(conn: &Connection, ids: &[SnapshotId]) -> Result<Vec<Snapshot>> {
    let mut store = SqliteStore::new(conn);
    let toggled = SnapshotAdmin::default().batch_toggle_enabled(&mut store, ids)?;
    tracing::info!(requested = ids.len(), toggled = toggled.len(), "snapshots toggled");
    Ok(toggled)
}

/// Snapshots of a site, optionally filtered by route name substring.
pub fn list_snapshots(
    conn: &Connection,
    site_id: Option<SiteId>,
    route_filter: Option<&str>,
) -> Result<Vec<Snapshot>> {
    let store = SqliteStore::new(conn);
    Ok(SnapshotAdmin::default().list(&store, site_id, route_filter)?)
}
