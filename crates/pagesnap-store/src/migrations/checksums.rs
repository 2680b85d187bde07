//! Migration checksums
//!
//! A SHA-256 of each migration's SQL is recorded when it is applied and
//! compared on every later run.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of the migration SQL
pub fn compute_checksum(sql: &str) -> String {
    hex::encode(Sha256::digest(sql.as_bytes()))
}
