use serde::{Deserialize, Serialize};

pub type SiteId = i64;

/// Host name that matches any request host during site selection
pub const ANY_HOST: &str = "localhost";

/// A site: a host + path prefix + locale scope partitioning pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: Option<SiteId>,
    pub name: String,
    pub host: String,

    /// Path prefix such as `/fr`; None or empty for the host root
    pub relative_path: Option<String>,
    pub locale: Option<String>,
    pub enabled: bool,
    pub is_default: bool,
}

impl Site {
    pub fn new(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            host: host.into(),
            relative_path: None,
            locale: None,
            enabled: true,
            is_default: false,
        }
    }

    pub fn with_id(mut self, id: SiteId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_relative_path(mut self, path: impl Into<String>) -> Self {
        self.relative_path = Some(path.into());
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    /// Relative path, or "" when the site lives at the host root
    pub fn relative_path_or_empty(&self) -> &str {
        self.relative_path.as_deref().unwrap_or("")
    }

    /// Whether this site answers requests for the given host
    pub fn matches_host(&self, host: &str) -> bool {
        self.host == ANY_HOST || self.host.eq_ignore_ascii_case(host)
    }

    /// Human readable url, used in report headers
    pub fn url(&self) -> String {
        format!("{}{}", self.host, self.relative_path_or_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_localhost_matches_any_host() {
        let site = Site::new("fr", ANY_HOST);
        assert!(site.matches_host("example.org"));
        let site = Site::new("org", "sonata-project.org");
        assert!(site.matches_host("Sonata-Project.org"));
        assert!(!site.matches_host("sonata-project.com"));
    }

    #[test]
    fn test_url() {
        let site = Site::new("fr", "example.org").with_relative_path("/fr");
        assert_eq!(site.url(), "example.org/fr");
        assert_eq!(Site::new("root", "example.org").url(), "example.org");
    }
}
