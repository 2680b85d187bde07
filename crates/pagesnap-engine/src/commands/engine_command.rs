//! Engine-level commands.

#![allow(clippy::result_large_err)]

use pagesnap_core::errors::{ExError, ExErrorKind};
use pagesnap_core::model::{Site, SiteId, Snapshot, SnapshotId};
use pagesnap_core::routing::ReconciliationReport;
use pagesnap_store::errors::Result;
use pagesnap_store::RoutingConfigV0;
use rusqlite::Connection;

use crate::commands::publish::{self, PublishSummary};
use crate::commands::reconcile::{self, ReconcileOptions};
use crate::commands::site;

/// Engine-level commands that require the database.
#[derive(Debug, Clone)]
pub enum EngineCommand {
    AddSite(Site),
    ListSites,
    /// Reconcile one site, or every site when `site_id` is None.
    ReconcileRoutes {
        site_id: Option<SiteId>,
        options: ReconcileOptions,
    },
    /// Publish one site, or every site when `site_id` is None.
    Publish { site_id: Option<SiteId> },
    ToggleSnapshots { ids: Vec<SnapshotId> },
    ListSnapshots {
        site_id: Option<SiteId>,
        route_filter: Option<String>,
    },
}

/// Result of applying an engine command.
#[derive(Debug, Clone)]
pub enum EngineCommandResult {
    Site(Site),
    Sites(Vec<Site>),
    Reconciled(Vec<ReconciliationReport>),
    Published(Vec<PublishSummary>),
    Snapshots(Vec<Snapshot>),
}

/// Apply an engine command.
///
/// `routing` is required by `ReconcileRoutes` only.
pub fn apply_engine_command(
    cmd: EngineCommand,
    conn: &Connection,
    routing: Option<&RoutingConfigV0>,
) -> Result<EngineCommandResult> {
    match cmd {
        EngineCommand::AddSite(new_site) => {
            site::add_site(conn, new_site).map(EngineCommandResult::Site)
        }
        EngineCommand::ListSites => site::list_sites(conn).map(EngineCommandResult::Sites),
        EngineCommand::ReconcileRoutes { site_id, options } => {
            let config = routing.ok_or_else(|| {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_op("reconcile_routes")
                    .with_message("a routing config is required")
            })?;
            let reports = match site_id {
                Some(site_id) => vec![reconcile::reconcile_site(conn, config, site_id, options)?],
                None => reconcile::reconcile_all(conn, config, options)?,
            };
            Ok(EngineCommandResult::Reconciled(reports))
        }
        EngineCommand::Publish { site_id } => {
            let summaries = match site_id {
                Some(site_id) => vec![publish::publish_site(conn, site_id)?],
                None => publish::publish_all(conn)?,
            };
            Ok(EngineCommandResult::Published(summaries))
        }
        EngineCommand::ToggleSnapshots { ids } => {
            publish::toggle_snapshots(conn, &ids).map(EngineCommandResult::Snapshots)
        }
        EngineCommand::ListSnapshots {
            site_id,
            route_filter,
        } => publish::list_snapshots(conn, site_id, route_filter.as_deref())
            .map(EngineCommandResult::Snapshots),
    }
}
