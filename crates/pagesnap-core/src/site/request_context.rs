//! Request context with site overrides
//!
//! [`SiteRequestContext`] wraps the framework's [`RequestContext`] and the
//! site selector. It only overrides the host and the base url; everything
//! else is read from the wrapped context.

use crate::site::selector::SiteSelector;

/// Framework request attributes used to generate urls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub base_url: String,
    pub method: String,
    pub host: String,
    pub scheme: String,
    pub http_port: u16,
    pub https_port: u16,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            method: "GET".to_string(),
            host: "localhost".to_string(),
            scheme: "http".to_string(),
            http_port: 80,
            https_port: 443,
        }
    }
}

impl RequestContext {
    pub fn new(base_url: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            host: host.into(),
            ..Self::default()
        }
    }
}

/// Read-only view of a request context adjusted for the selected site
pub struct SiteRequestContext<'a, S: ?Sized> {
    inner: &'a RequestContext,
    selector: &'a S,
}

impl<'a, S: SiteSelector + ?Sized> SiteRequestContext<'a, S> {
    pub fn new(inner: &'a RequestContext, selector: &'a S) -> Self {
        Self { inner, selector }
    }

    /// Selected site's host, or the request host
    pub fn host(&self) -> &str {
        self.selector
            .retrieve()
            .map_or(self.inner.host.as_str(), |site| site.host.as_str())
    }

    /// Request base url followed by the selected site's relative path
    pub fn base_url(&self) -> String {
        match self.selector.retrieve() {
            Some(site) => format!("{}{}", self.inner.base_url, site.relative_path_or_empty()),
            None => self.inner.base_url.clone(),
        }
    }

    pub fn method(&self) -> &str {
        &self.inner.method
    }

    pub fn scheme(&self) -> &str {
        &self.inner.scheme
    }

    pub fn http_port(&self) -> u16 {
        self.inner.http_port
    }

    pub fn https_port(&self) -> u16 {
        self.inner.https_port
    }

    pub fn inner(&self) -> &RequestContext {
        self.inner
    }
}
