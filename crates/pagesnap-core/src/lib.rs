//! PageSnap Core - page reconciliation and snapshot publication
//!
//! This crate provides the storage-independent kernel of PageSnap:
//! - Page, route, site, block and snapshot models
//! - Persistence ports and an in-memory store
//! - Route reconciliation of hybrid pages against the routing table
//! - Snapshot transformation, publication and admin hooks
//! - Site selection and the site-aware request context
//! - Error and logging facilities shared by the other crates

pub mod cache;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod routing;
pub mod site;
pub mod snapshot;

pub use pagesnap_core_types as core_types;

// Re-export commonly used types
pub use cache::{CacheKeys, CacheManager, MemoryCache};
pub use errors::{ExError, ExErrorKind, PageSnapError, Result};
pub use model::{Block, Page, Route, RouteCollection, Site, Snapshot};
pub use ops::{
    in_transaction, MemoryStore, PageCriteria, PageStore, RouteCatalog, SiteStore,
    SnapshotManager, UnitOfWork,
};
pub use routing::{
    DecoratorStrategy, ReconciliationAction, ReconciliationReport, RoutePageGenerator,
};
pub use snapshot::{CreateSnapshotService, SnapshotAdmin, SnapshotTransformer, Transformer};
