//! CLI command implementations

pub mod migrate;
pub mod routes;
pub mod site;
pub mod snapshot;

use clap::Args;
use rusqlite::Connection;
use std::path::PathBuf;

/// Database location shared by every command
#[derive(Debug, Args)]
pub struct DbArgs {
    /// Path to the SQLite database
    #[arg(long, default_value = ".pagesnap/pagesnap.db")]
    pub db: PathBuf,
}

impl DbArgs {
    /// Open the database, creating its directory and schema when missing
    pub fn open(&self) -> Result<Connection, Box<dyn std::error::Error>> {
        if let Some(parent) = self.db.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(pagesnap_store::db::open_and_migrate(&self.db)?)
    }
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: serde::Serialize + ?Sized>(
    value: &T,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
