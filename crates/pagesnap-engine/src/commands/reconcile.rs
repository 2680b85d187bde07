//! Route reconciliation orchestration.
//!
//! Each site is reconciled in its own unit of work: a failing site leaves
//! its pages untouched and aborts the run, sites already reconciled stay
//! committed.

#![allow(clippy::result_large_err)]

use std::time::Instant;

use pagesnap_core::errors::ExError;
use pagesnap_core::model::SiteId;
use pagesnap_core::ops::{in_transaction, SiteStore};
use pagesnap_core::routing::{ReconciliationReport, RoutePageGenerator};
use pagesnap_core::{log_op_end, log_op_error, log_op_start};
use pagesnap_core_types::RunContext;
use pagesnap_store::errors::Result;
use pagesnap_store::{RoutingConfigV0, SqliteStore};
use rusqlite::Connection;

use crate::commands::site::load_site;

/// Options for a reconciliation run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions {
    /// Delete hybrid pages whose route vanished instead of reporting them
    pub cleanup: bool,
}

fn generator(
    config: &RoutingConfigV0,
) -> Result<RoutePageGenerator<pagesnap_core::RouteCollection>> {
    Ok(RoutePageGenerator::new(
        config.to_route_collection(),
        config.decorator_strategy()?,
        config.http_error_codes.clone(),
    ))
}

/// Reconcile the pages of one site with the routing config.
pub fn reconcile_site(
    conn: &Connection,
    config: &RoutingConfigV0,
    site_id: SiteId,
    options: ReconcileOptions,
) -> Result<ReconciliationReport> {
    let ctx = RunContext::for_site(site_id);
    let start = Instant::now();
    log_op_start!("engine_reconcile_site", site_id = site_id, run_id = %ctx.run_id);

    let result = load_site(conn, site_id).and_then(|site| {
        let gen = generator(config)?;
        let mut store = SqliteStore::new(conn);
        let report = in_transaction(&mut store, |store| gen.update(store, &site, options.cleanup))?;
        Ok(report)
    });

    match result {
        Ok(report) => {
            log_op_end!(
                "engine_reconcile_site",
                duration_ms = start.elapsed().as_millis() as u64,
                site_id = site_id,
                run_id = %ctx.run_id,
                actions = report.actions.len()
            );
            Ok(report)
        }
        Err(err) => {
            let err = err.with_run_id(ctx.run_id.clone());
            log_op_error!(
                "engine_reconcile_site",
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                site_id = site_id,
                run_id = %ctx.run_id
            );
            Err(err)
        }
    }
}

/// Reconcile every registered site, in id order.
pub fn reconcile_all(
    conn: &Connection,
    config: &RoutingConfigV0,
    options: ReconcileOptions,
) -> Result<Vec<ReconciliationReport>> {
    let start = Instant::now();
    let sites = SqliteStore::new(conn)
        .list_sites()
        .map_err(ExError::from)?;
    log_op_start!("engine_reconcile_all", site_count = sites.len());

    let mut reports = Vec::with_capacity(sites.len());
    for site in &sites {
        let Some(site_id) = site.id else { continue };
        match reconcile_site(conn, config, site_id, options) {
            Ok(report) => reports.push(report),
            Err(err) => {
                log_op_error!(
                    "engine_reconcile_all",
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    site_id = site_id
                );
                return Err(err);
            }
        }
    }

    log_op_end!(
        "engine_reconcile_all",
        duration_ms = start.elapsed().as_millis() as u64,
        site_count = reports.len()
    );
    Ok(reports)
}
