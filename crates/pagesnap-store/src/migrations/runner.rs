//! Migration runner
//!
//! Every embedded migration is either recorded in `schema_version` with a
//! matching checksum, or pending. Pending migrations run in order, each in
//! its own transaction.

use crate::errors::{checksum_mismatch, from_rusqlite, migration_error, Result};
use crate::migrations::checksums::compute_checksum;
use crate::migrations::embedded::{get_migrations, Migration};
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

const SCHEMA_VERSION_DDL: &str = "CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY,
    migration_id TEXT NOT NULL UNIQUE,
    applied_at TEXT NOT NULL,
    checksum TEXT NOT NULL
)";

/// Bring the schema up to date
///
/// Fails with a constraint violation when an applied migration no longer
/// matches the embedded SQL.
pub fn apply_migrations(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_VERSION_DDL).map_err(from_rusqlite)?;

    let mut pending = Vec::new();
    for migration in get_migrations() {
        let checksum = compute_checksum(migration.sql);
        match recorded_checksum(conn, migration.id)? {
            Some(recorded) if recorded != checksum => {
                return Err(checksum_mismatch(migration.id, &recorded, &checksum));
            }
            Some(_) => {}
            None => pending.push((migration, checksum)),
        }
    }

    let applied = pending.len();
    for (migration, checksum) in pending {
        run_migration(conn, &migration, &checksum)?;
    }

    if applied > 0 {
        tracing::info!(applied, "schema migrated");
    }
    Ok(())
}

/// Applied migration ids in application order
pub fn applied_migrations(conn: &Connection) -> Result<Vec<String>> {
    conn.execute_batch(SCHEMA_VERSION_DDL).map_err(from_rusqlite)?;
    let mut stmt = conn
        .prepare("SELECT migration_id FROM schema_version ORDER BY id")
        .map_err(from_rusqlite)?;
    let ids = stmt
        .query_map([], |row| row.get(0))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<String>, _>>()
        .map_err(from_rusqlite)?;
    Ok(ids)
}

fn recorded_checksum(conn: &Connection, migration_id: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT checksum FROM schema_version WHERE migration_id = ?1",
        [migration_id],
        |row| row.get(0),
    )
    .optional()
    .map_err(from_rusqlite)
}

fn run_migration(conn: &mut Connection, migration: &Migration, checksum: &str) -> Result<()> {
    let tx = conn.transaction().map_err(from_rusqlite)?;
    tx.execute_batch(migration.sql)
        .map_err(|e| migration_error(migration.id, &e.to_string()))?;
    tx.execute(
        "INSERT INTO schema_version (migration_id, applied_at, checksum) VALUES (?1, ?2, ?3)",
        params![
            migration.id,
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            checksum
        ],
    )
    .map_err(from_rusqlite)?;
    tx.commit().map_err(from_rusqlite)?;

    tracing::debug!(migration_id = migration.id, "migration applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_migrations() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        assert_eq!(
            applied_migrations(&conn).unwrap(),
            vec!["001_sites_and_pages", "002_snapshots"]
        );
    }

    #[test]
    fn test_idempotency() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        apply_migrations(&mut conn).unwrap();
        assert_eq!(applied_migrations(&conn).unwrap().len(), 2);
    }

    #[test]
    fn test_tampered_checksum_is_rejected() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        conn.execute(
            "UPDATE schema_version SET checksum = 'deadbeef' WHERE migration_id = '002_snapshots'",
            [],
        )
        .unwrap();

        let err = apply_migrations(&mut conn).unwrap_err();
        assert_eq!(err.code(), "ERR_CONSTRAINT_VIOLATION");
    }

    #[test]
    fn test_applied_at_is_rfc3339() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        let applied_at: String = conn
            .query_row("SELECT applied_at FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&applied_at).is_ok());
    }
}
