//! Site registration and lookup

#![allow(clippy::result_large_err)]

use pagesnap_core::errors::PageSnapError;
use pagesnap_core::model::{Site, SiteId};
use pagesnap_core::ops::SiteStore;
use pagesnap_store::errors::Result;
use pagesnap_store::SqliteStore;
use rusqlite::Connection;

/// Persist a new site and return it with its id
pub fn add_site(conn: &Connection, mut site: Site) -> Result<Site> {
    if site.name.trim().is_empty() || site.host.trim().is_empty() {
        return Err(PageSnapError::InvalidInput {
            reason: "site name and host must not be empty".to_string(),
        }
        .into());
    }
    SqliteStore::new(conn).save_site(&mut site)?;
    tracing::info!(site_id = ?site.id, host = %site.host, "site added");
    Ok(site)
}

pub fn list_sites(conn: &Connection) -> Result<Vec<Site>> {
    Ok(SqliteStore::new(conn).list_sites()?)
}

/// Site by id, `NotFound` when missing
pub fn load_site(conn: &Connection, site_id: SiteId) -> Result<Site> {
    SqliteStore::new(conn)
        .find_site(site_id)?
        .ok_or_else(|| PageSnapError::SiteNotFound { site_id }.into())
}
