//! Repository layer
//!
//! SQLite implementation of the pagesnap-core persistence ports

mod sqlite_store;

pub use sqlite_store::SqliteStore;
