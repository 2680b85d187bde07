pub mod block;
pub mod page;
pub mod route;
pub mod site;
pub mod snapshot;

pub use block::Block;
pub use page::{Page, PageId, CMS_ROUTE_NAME, DEFAULT_REQUEST_METHOD, INTERNAL_ROUTE_PREFIX};
pub use route::{Route, RouteCollection};
pub use site::{Site, SiteId, ANY_HOST};
pub use snapshot::{ChildRef, Snapshot, SnapshotContent, SnapshotId};
