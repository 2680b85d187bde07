use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::block::Block;
use super::site::SiteId;

pub type PageId = i64;

/// Route serving user-editable CMS pages; every other route name is hybrid
pub const CMS_ROUTE_NAME: &str = "page_slug";

/// Prefix of route names reserved for internal pages (error pages)
pub const INTERNAL_ROUTE_PREFIX: &str = "_page_internal_";

pub const DEFAULT_REQUEST_METHOD: &str = "GET|POST|HEAD|DELETE|PUT";

/// A page of a site
///
/// Pages form a tree per site, rooted at the homepage (url `/`). A page
/// bound to a route other than the CMS route is a *hybrid* page: its url
/// comes from the routing table instead of the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Store-assigned id; None until the page is first saved
    pub id: Option<PageId>,
    pub site_id: SiteId,
    pub parent_id: Option<PageId>,
    pub route_name: String,
    pub name: String,
    pub url: Option<String>,
    pub slug: Option<String>,
    pub request_method: String,
    pub enabled: bool,

    /// True when the page changed since its last snapshot
    pub edited: bool,

    /// Whether the page is wrapped by the site layout when rendered
    pub decorate: bool,
    pub position: i32,
    pub blocks: Vec<Block>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Page {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: None,
            site_id: 0,
            parent_id: None,
            route_name: CMS_ROUTE_NAME.to_string(),
            name: String::new(),
            url: None,
            slug: None,
            request_method: DEFAULT_REQUEST_METHOD.to_string(),
            enabled: true,
            edited: true,
            decorate: true,
            position: 1,
            blocks: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Page {
    /// New unsaved page bound to a route
    pub fn new(site_id: SiteId, route_name: impl Into<String>) -> Self {
        let route_name = route_name.into();
        Self {
            site_id,
            name: route_name.clone(),
            route_name,
            ..Self::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.slug = Some(url.clone());
        self.url = Some(url);
        self
    }

    pub fn with_parent(mut self, parent_id: PageId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn is_hybrid(&self) -> bool {
        self.route_name != CMS_ROUTE_NAME
    }

    pub fn is_internal(&self) -> bool {
        self.route_name.starts_with(INTERNAL_ROUTE_PREFIX)
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_cms(&self) -> bool {
        !self.is_hybrid()
    }

    /// Route name of the internal page rendering an HTTP error code
    pub fn error_route_name(status_code: u16) -> String {
        format!("{}error_{}", INTERNAL_ROUTE_PREFIX, status_code)
    }

    /// Mark the page modified now
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_page_is_hybrid_and_edited() {
        let page = Page::new(1, "route1").with_url("/first");
        assert!(page.is_hybrid());
        assert!(!page.is_internal());
        assert!(page.edited);
        assert!(page.enabled);
        assert_eq!(page.slug.as_deref(), Some("/first"));
        assert_eq!(page.name, "route1");
    }

    #[test]
    fn test_default_page_is_cms() {
        let page = Page::default();
        assert!(page.is_cms());
        assert!(page.is_root());
    }

    #[test]
    fn test_error_route_names_are_internal() {
        let name = Page::error_route_name(404);
        assert_eq!(name, "_page_internal_error_404");
        assert!(Page::new(1, name).is_internal());
    }
}
