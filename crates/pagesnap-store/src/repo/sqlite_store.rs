//! SQLite store implementation
//!
//! Implements every persistence port of pagesnap-core on top of a borrowed
//! rusqlite connection. Units of work map to nested savepoints, so a store
//! can be used with or without an enclosing connection-level transaction.

#![allow(clippy::result_large_err)]

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use pagesnap_core::errors::{PageSnapError, Result};
use pagesnap_core::model::{Page, PageId, Site, SiteId, Snapshot, SnapshotId};
use pagesnap_core::ops::{
    in_transaction, PageCriteria, PageStore, SiteStore, SnapshotManager, UnitOfWork,
};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Params, Row};
use serde::de::DeserializeOwned;

use crate::errors::{from_json, from_rusqlite};

const PAGE_COLUMNS: &str = "id, site_id, parent_id, route_name, name, url, slug, request_method, \
     enabled, edited, decorate, position, blocks, created_at, updated_at";

const SNAPSHOT_COLUMNS: &str = "id, page_id, site_id, parent_id, route_name, url, name, enabled, \
     publication_date_start, publication_date_end, content, created_at";

const SITE_COLUMNS: &str = "id, name, host, relative_path, locale, enabled, is_default";

/// Page, snapshot and site store over one SQLite connection
///
/// Not thread-safe; open one connection (and one store) per worker.
pub struct SqliteStore<'c> {
    conn: &'c Connection,
    depth: usize,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn, depth: 0 }
    }

    pub fn conn(&self) -> &'c Connection {
        self.conn
    }

    fn savepoint_name(depth: usize) -> String {
        format!("pagesnap_sp_{}", depth)
    }

    fn query_pages<P: Params>(&self, sql: &str, params: P) -> Result<Vec<Page>> {
        let mut stmt = self.conn.prepare(sql).map_err(from_rusqlite)?;
        let pages = stmt
            .query_map(params, page_from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(pages)
    }

    fn query_snapshots<P: Params>(&self, sql: &str, params: P) -> Result<Vec<Snapshot>> {
        let mut stmt = self.conn.prepare(sql).map_err(from_rusqlite)?;
        let snapshots = stmt
            .query_map(params, snapshot_from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(snapshots)
    }

    fn page_exists(&self, page_id: PageId) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row("SELECT 1 FROM pages WHERE id = ?", [page_id], |row| row.get(0))
            .optional()
            .map_err(from_rusqlite)?;
        Ok(found.is_some())
    }

    fn snapshot_exists(&self, snapshot_id: SnapshotId) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row("SELECT 1 FROM snapshots WHERE id = ?", [snapshot_id], |row| row.get(0))
            .optional()
            .map_err(from_rusqlite)?;
        Ok(found.is_some())
    }

    fn check_page_invariants(&self, page: &Page) -> Result<()> {
        if page.is_hybrid() {
            let clash: Option<i64> = self
                .conn
                .query_row(
                    "SELECT id FROM pages
                     WHERE site_id = ?1 AND route_name = ?2 AND (?3 IS NULL OR id <> ?3)
                     LIMIT 1",
                    params![page.site_id, page.route_name, page.id],
                    |row| row.get(0),
                )
                .optional()
                .map_err(from_rusqlite)?;
            if clash.is_some() {
                return Err(PageSnapError::DuplicateRoute {
                    site_id: page.site_id,
                    route_name: page.route_name.clone(),
                });
            }
        }

        if let Some(parent_id) = page.parent_id {
            let parent_site_id: SiteId = self
                .conn
                .query_row("SELECT site_id FROM pages WHERE id = ?", [parent_id], |row| {
                    row.get(0)
                })
                .optional()
                .map_err(from_rusqlite)?
                .ok_or(PageSnapError::PageNotFound { page_id: parent_id })?;
            if parent_site_id != page.site_id {
                return Err(PageSnapError::ParentSiteMismatch {
                    page_id: page.id.unwrap_or_default(),
                    page_site_id: page.site_id,
                    parent_id,
                    parent_site_id,
                });
            }
        }
        Ok(())
    }
}

impl PageStore for SqliteStore<'_> {
    fn find_by(&self, criteria: &PageCriteria) -> Result<Vec<Page>> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        if let Some(site_id) = criteria.site_id {
            clauses.push("site_id = ?");
            values.push(Value::Integer(site_id));
        }
        if let Some(route_name) = &criteria.route_name {
            clauses.push("route_name = ?");
            values.push(Value::Text(route_name.clone()));
        }
        if let Some(url) = &criteria.url {
            clauses.push("url = ?");
            values.push(Value::Text(url.clone()));
        }
        if let Some(parent_id) = criteria.parent_id {
            clauses.push("parent_id = ?");
            values.push(Value::Integer(parent_id));
        }
        if let Some(edited) = criteria.edited {
            clauses.push("edited = ?");
            values.push(Value::Integer(i64::from(edited)));
        }

        let filter = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        let sql = format!("SELECT {} FROM pages{} ORDER BY id", PAGE_COLUMNS, filter);
        self.query_pages(&sql, params_from_iter(values))
    }

    fn find_page(&self, page_id: PageId) -> Result<Option<Page>> {
        let sql = format!("SELECT {} FROM pages WHERE id = ?", PAGE_COLUMNS);
        Ok(self.query_pages(&sql, [page_id])?.into_iter().next())
    }

    fn save_page(&mut self, page: &mut Page) -> Result<()> {
        self.check_page_invariants(page)?;
        page.touch();

        let blocks = serde_json::to_string(&page.blocks).map_err(|e| from_json("blocks", e))?;
        self.conn
            .execute(
                "INSERT INTO pages (id, site_id, parent_id, route_name, name, url, slug, request_method,
                                    enabled, edited, decorate, position, blocks, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
                 ON CONFLICT(id) DO UPDATE SET
                    site_id = excluded.site_id,
                    parent_id = excluded.parent_id,
                    route_name = excluded.route_name,
                    name = excluded.name,
                    url = excluded.url,
                    slug = excluded.slug,
                    request_method = excluded.request_method,
                    enabled = excluded.enabled,
                    edited = excluded.edited,
                    decorate = excluded.decorate,
                    position = excluded.position,
                    blocks = excluded.blocks,
                    updated_at = excluded.updated_at",
                params![
                    page.id,
                    page.site_id,
                    page.parent_id,
                    page.route_name,
                    page.name,
                    page.url,
                    page.slug,
                    page.request_method,
                    page.enabled,
                    page.edited,
                    page.decorate,
                    page.position,
                    blocks,
                    timestamp_to_sql(&page.created_at),
                    timestamp_to_sql(&page.updated_at),
                ],
            )
            .map_err(from_rusqlite)?;

        if page.id.is_none() {
            page.id = Some(self.conn.last_insert_rowid());
        }
        Ok(())
    }

    fn delete_page(&mut self, page: &Page) -> Result<()> {
        let Some(page_id) = page.id else {
            return Err(PageSnapError::PageNotPersisted {
                route_name: page.route_name.clone(),
            });
        };
        if !self.page_exists(page_id)? {
            return Err(PageSnapError::PageNotFound { page_id });
        }

        // Children move to the root level; the page's snapshots go with it
        in_transaction(self, |store| {
            store
                .conn
                .execute("UPDATE pages SET parent_id = NULL WHERE parent_id = ?", [page_id])
                .map_err(from_rusqlite)?;
            store
                .conn
                .execute("DELETE FROM snapshots WHERE page_id = ?", [page_id])
                .map_err(from_rusqlite)?;
            store
                .conn
                .execute("DELETE FROM pages WHERE id = ?", [page_id])
                .map_err(from_rusqlite)?;
            Ok(())
        })
    }
}

impl SnapshotManager for SqliteStore<'_> {
    fn save_snapshot(&mut self, snapshot: &mut Snapshot) -> Result<()> {
        if !self.page_exists(snapshot.page_id)? {
            return Err(PageSnapError::PageNotFound {
                page_id: snapshot.page_id,
            });
        }

        match snapshot.id {
            None => {
                let content = serde_json::to_string(&snapshot.content)
                    .map_err(|e| from_json("content", e))?;
                self.conn
                    .execute(
                        "INSERT INTO snapshots (page_id, site_id, parent_id, route_name, url, name, enabled,
                                                publication_date_start, publication_date_end, content, created_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                        params![
                            snapshot.page_id,
                            snapshot.site_id,
                            snapshot.parent_id,
                            snapshot.route_name,
                            snapshot.url,
                            snapshot.name,
                            snapshot.enabled,
                            snapshot.publication_date_start.as_ref().map(timestamp_to_sql),
                            snapshot.publication_date_end.as_ref().map(timestamp_to_sql),
                            content,
                            timestamp_to_sql(&snapshot.created_at),
                        ],
                    )
                    .map_err(from_rusqlite)?;
                snapshot.id = Some(self.conn.last_insert_rowid());
            }
            Some(snapshot_id) => {
                // Content is immutable once captured
                let updated = self
                    .conn
                    .execute(
                        "UPDATE snapshots
                         SET enabled = ?1, publication_date_start = ?2, publication_date_end = ?3, name = ?4
                         WHERE id = ?5",
                        params![
                            snapshot.enabled,
                            snapshot.publication_date_start.as_ref().map(timestamp_to_sql),
                            snapshot.publication_date_end.as_ref().map(timestamp_to_sql),
                            snapshot.name,
                            snapshot_id,
                        ],
                    )
                    .map_err(from_rusqlite)?;
                if updated == 0 {
                    return Err(PageSnapError::SnapshotNotFound { snapshot_id });
                }
            }
        }
        Ok(())
    }

    fn enable_snapshots(&mut self, snapshots: &mut [Snapshot], at: DateTime<Utc>) -> Result<()> {
        for snapshot in snapshots.iter() {
            let id = snapshot.id.ok_or(PageSnapError::SnapshotNotPersisted {
                page_id: snapshot.page_id,
            })?;
            if !self.snapshot_exists(id)? {
                return Err(PageSnapError::SnapshotNotFound { snapshot_id: id });
            }
        }

        let at_sql = timestamp_to_sql(&at);
        let targets: Vec<(SnapshotId, PageId)> = snapshots
            .iter()
            .filter_map(|s| s.id.map(|id| (id, s.page_id)))
            .collect();

        // Disable before enabling so the one-enabled-per-page index never trips
        in_transaction(self, |store| {
            for (id, page_id) in &targets {
                store
                    .conn
                    .execute(
                        "UPDATE snapshots
                         SET enabled = 0, publication_date_end = COALESCE(publication_date_end, ?1)
                         WHERE page_id = ?2 AND enabled = 1 AND id <> ?3",
                        params![at_sql, page_id, id],
                    )
                    .map_err(from_rusqlite)?;
                store
                    .conn
                    .execute(
                        "UPDATE snapshots
                         SET enabled = 1, publication_date_start = ?1, publication_date_end = NULL
                         WHERE id = ?2",
                        params![at_sql, id],
                    )
                    .map_err(from_rusqlite)?;
            }
            Ok(())
        })?;

        // The last entry per page wins; earlier ones were enabled then closed
        let winners: HashMap<PageId, SnapshotId> =
            targets.iter().map(|(id, page_id)| (*page_id, *id)).collect();
        for snapshot in snapshots.iter_mut() {
            let active = snapshot.id == winners.get(&snapshot.page_id).copied();
            snapshot.enabled = active;
            snapshot.publication_date_start = Some(at);
            snapshot.publication_date_end = if active { None } else { Some(at) };
        }
        Ok(())
    }

    fn disable_snapshot(&mut self, snapshot: &mut Snapshot, at: DateTime<Utc>) -> Result<()> {
        let snapshot_id = snapshot.id.ok_or(PageSnapError::SnapshotNotPersisted {
            page_id: snapshot.page_id,
        })?;
        let updated = self
            .conn
            .execute(
                "UPDATE snapshots
                 SET enabled = 0, publication_date_end = COALESCE(publication_date_end, ?1)
                 WHERE id = ?2",
                params![timestamp_to_sql(&at), snapshot_id],
            )
            .map_err(from_rusqlite)?;
        if updated == 0 {
            return Err(PageSnapError::SnapshotNotFound { snapshot_id });
        }

        *snapshot = self
            .find_snapshot(snapshot_id)?
            .ok_or(PageSnapError::SnapshotNotFound { snapshot_id })?;
        Ok(())
    }

    fn find_snapshot(&self, snapshot_id: SnapshotId) -> Result<Option<Snapshot>> {
        let sql = format!("SELECT {} FROM snapshots WHERE id = ?", SNAPSHOT_COLUMNS);
        Ok(self.query_snapshots(&sql, [snapshot_id])?.into_iter().next())
    }

    fn find_enabled_snapshot(&self, page_id: PageId) -> Result<Option<Snapshot>> {
        let sql = format!(
            "SELECT {} FROM snapshots WHERE page_id = ? AND enabled = 1",
            SNAPSHOT_COLUMNS
        );
        Ok(self.query_snapshots(&sql, [page_id])?.into_iter().next())
    }

    fn find_enabled_children(&self, page_id: PageId) -> Result<Vec<Snapshot>> {
        let sql = format!(
            "SELECT {} FROM snapshots
             WHERE parent_id = ? AND enabled = 1
             ORDER BY json_extract(content, '$.position'), page_id",
            SNAPSHOT_COLUMNS
        );
        self.query_snapshots(&sql, [page_id])
    }

    fn find_snapshots_by_page(&self, page_id: PageId) -> Result<Vec<Snapshot>> {
        let sql = format!(
            "SELECT {} FROM snapshots WHERE page_id = ? ORDER BY id",
            SNAPSHOT_COLUMNS
        );
        self.query_snapshots(&sql, [page_id])
    }

    fn find_by_route_name(
        &self,
        site_id: Option<SiteId>,
        route_filter: Option<&str>,
    ) -> Result<Vec<Snapshot>> {
        let sql = format!(
            "SELECT {} FROM snapshots
             WHERE (?1 IS NULL OR site_id = ?1) AND (?2 IS NULL OR instr(route_name, ?2) > 0)
             ORDER BY id",
            SNAPSHOT_COLUMNS
        );
        self.query_snapshots(&sql, params![site_id, route_filter])
    }
}

impl SiteStore for SqliteStore<'_> {
    fn save_site(&mut self, site: &mut Site) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO sites (id, name, host, relative_path, locale, enabled, is_default)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    host = excluded.host,
                    relative_path = excluded.relative_path,
                    locale = excluded.locale,
                    enabled = excluded.enabled,
                    is_default = excluded.is_default",
                params![
                    site.id,
                    site.name,
                    site.host,
                    site.relative_path,
                    site.locale,
                    site.enabled,
                    site.is_default,
                ],
            )
            .map_err(from_rusqlite)?;

        if site.id.is_none() {
            site.id = Some(self.conn.last_insert_rowid());
        }
        Ok(())
    }

    fn find_site(&self, site_id: SiteId) -> Result<Option<Site>> {
        let site = self
            .conn
            .query_row(
                &format!("SELECT {} FROM sites WHERE id = ?", SITE_COLUMNS),
                [site_id],
                site_from_row,
            )
            .optional()
            .map_err(from_rusqlite)?;
        Ok(site)
    }

    fn list_sites(&self) -> Result<Vec<Site>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM sites ORDER BY id", SITE_COLUMNS))
            .map_err(from_rusqlite)?;
        let sites = stmt
            .query_map([], site_from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(sites)
    }
}

impl UnitOfWork for SqliteStore<'_> {
    fn begin(&mut self) -> Result<()> {
        let name = Self::savepoint_name(self.depth + 1);
        self.conn
            .execute_batch(&format!("SAVEPOINT {};", name))
            .map_err(from_rusqlite)?;
        self.depth += 1;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        if self.depth == 0 {
            return Err(PageSnapError::UnitOfWork {
                message: "commit without begin".to_string(),
            });
        }
        let name = Self::savepoint_name(self.depth);
        self.conn
            .execute_batch(&format!("RELEASE {};", name))
            .map_err(from_rusqlite)?;
        self.depth -= 1;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        if self.depth == 0 {
            return Err(PageSnapError::UnitOfWork {
                message: "rollback without begin".to_string(),
            });
        }
        let name = Self::savepoint_name(self.depth);
        self.depth -= 1;
        self.conn
            .execute_batch(&format!("ROLLBACK TO {name}; RELEASE {name};", name = name))
            .map_err(from_rusqlite)?;
        Ok(())
    }

    fn depth(&self) -> usize {
        self.depth
    }
}

fn timestamp_to_sql(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_timestamp(idx, &raw)
}

fn optional_timestamp_column(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|value| parse_timestamp(idx, &value)).transpose()
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<Page> {
    Ok(Page {
        id: row.get(0)?,
        site_id: row.get(1)?,
        parent_id: row.get(2)?,
        route_name: row.get(3)?,
        name: row.get(4)?,
        url: row.get(5)?,
        slug: row.get(6)?,
        request_method: row.get(7)?,
        enabled: row.get(8)?,
        edited: row.get(9)?,
        decorate: row.get(10)?,
        position: row.get(11)?,
        blocks: json_column(row, 12)?,
        created_at: timestamp_column(row, 13)?,
        updated_at: timestamp_column(row, 14)?,
    })
}

fn snapshot_from_row(row: &Row<'_>) -> rusqlite::Result<Snapshot> {
    Ok(Snapshot {
        id: row.get(0)?,
        page_id: row.get(1)?,
        site_id: row.get(2)?,
        parent_id: row.get(3)?,
        route_name: row.get(4)?,
        url: row.get(5)?,
        name: row.get(6)?,
        enabled: row.get(7)?,
        publication_date_start: optional_timestamp_column(row, 8)?,
        publication_date_end: optional_timestamp_column(row, 9)?,
        content: json_column(row, 10)?,
        created_at: timestamp_column(row, 11)?,
    })
}

fn site_from_row(row: &Row<'_>) -> rusqlite::Result<Site> {
    Ok(Site {
        id: row.get(0)?,
        name: row.get(1)?,
        host: row.get(2)?,
        relative_path: row.get(3)?,
        locale: row.get(4)?,
        enabled: row.get(5)?,
        is_default: row.get(6)?,
    })
}
