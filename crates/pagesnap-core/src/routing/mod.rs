//! Route reconciliation
//!
//! ## Responsibilities
//!
//! - Decide which catalog routes belong to a site (decorator, host, locale)
//! - Create, realign, disable and clean up hybrid pages
//! - Render the line-oriented reconciliation report

pub mod decorator;
pub mod host_pattern;
pub mod reconciler;
pub mod report;

pub use decorator::DecoratorStrategy;
pub use reconciler::RoutePageGenerator;
pub use report::{ActionSummary, ReconciliationAction, ReconciliationReport};
