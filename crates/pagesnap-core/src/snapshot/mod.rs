//! Snapshot publication
//!
//! ## Responsibilities
//!
//! - Transform pages into self-contained snapshots and back
//! - Publish a page or a whole site atomically
//! - Administrative writes with cache invalidation
//! - Lazy page views over published snapshots
//!
//! ## Non-Responsibilities
//!
//! - Persistence (handled by `pagesnap-store`)
//! - Scheduling publication across sites (handled by `pagesnap-engine`)

pub mod admin;
pub mod proxy;
pub mod service;
pub mod transformer;

pub use admin::SnapshotAdmin;
pub use proxy::{SnapshotPageProxy, SnapshotPageProxyFactory};
pub use service::{CreateSnapshotService, PublishStore};
pub use transformer::{SnapshotTransformer, Transformer};
