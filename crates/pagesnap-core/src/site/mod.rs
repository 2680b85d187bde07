//! Multi-site resolution

pub mod request_context;
pub mod selector;

pub use request_context::{RequestContext, SiteRequestContext};
pub use selector::{HostPathSiteSelector, LocaleSiteSelector, SiteMatch, SiteSelector};
