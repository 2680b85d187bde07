pub mod ports;
pub mod store;
pub mod unit_of_work;

pub use ports::{PageCriteria, PageStore, RouteCatalog, SiteStore, SnapshotManager};
pub use store::MemoryStore;
pub use unit_of_work::{in_transaction, UnitOfWork};
