//! Decorator strategy: which routes may be bound to pages
//!
//! A route is decorable when its name is not explicitly ignored and neither
//! its name nor its path matches an ignore pattern. Patterns are anchored at
//! the start of the subject.

use regex::Regex;

use crate::errors::{PageSnapError, Result};

#[derive(Debug, Clone, Default)]
pub struct DecoratorStrategy {
    ignore_routes: Vec<String>,
    ignore_route_patterns: Vec<Regex>,
    ignore_uri_patterns: Vec<Regex>,
}

impl DecoratorStrategy {
    pub fn new<R, P, U>(
        ignore_routes: R,
        ignore_route_patterns: P,
        ignore_uri_patterns: U,
    ) -> Result<Self>
    where
        R: IntoIterator,
        R::Item: Into<String>,
        P: IntoIterator,
        P::Item: AsRef<str>,
        U: IntoIterator,
        U::Item: AsRef<str>,
    {
        Ok(Self {
            ignore_routes: ignore_routes.into_iter().map(Into::into).collect(),
            ignore_route_patterns: compile_all(ignore_route_patterns)?,
            ignore_uri_patterns: compile_all(ignore_uri_patterns)?,
        })
    }

    /// Strategy that accepts every non-empty route
    pub fn permissive() -> Self {
        Self::default()
    }

    pub fn is_route_name_decorable(&self, route_name: &str) -> bool {
        if route_name.is_empty() {
            return false;
        }
        if self.ignore_routes.iter().any(|r| r == route_name) {
            return false;
        }
        !self
            .ignore_route_patterns
            .iter()
            .any(|p| p.is_match(route_name))
    }

    pub fn is_route_uri_decorable(&self, uri: &str) -> bool {
        !self.ignore_uri_patterns.iter().any(|p| p.is_match(uri))
    }
}

fn compile_all<I>(patterns: I) -> Result<Vec<Regex>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    patterns
        .into_iter()
        .map(|pattern| {
            let pattern = pattern.as_ref();
            Regex::new(&format!("^(?:{})", pattern)).map_err(|e| PageSnapError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permissive_accepts_everything_but_empty() {
        let strategy = DecoratorStrategy::permissive();
        assert!(strategy.is_route_name_decorable("route1"));
        assert!(!strategy.is_route_name_decorable(""));
        assert!(strategy.is_route_uri_decorable("/anything"));
    }

    #[test]
    fn test_ignore_lists() {
        let strategy = DecoratorStrategy::new(
            ["sonata_cache_esi"],
            ["_", "(.*)admin(.*)"],
            ["/api/"],
        )
        .unwrap();

        assert!(!strategy.is_route_name_decorable("sonata_cache_esi"));
        assert!(!strategy.is_route_name_decorable("_wdt"));
        assert!(!strategy.is_route_name_decorable("sonata_admin_dashboard"));
        assert!(strategy.is_route_name_decorable("blog_index"));

        assert!(!strategy.is_route_uri_decorable("/api/pages"));
        assert!(strategy.is_route_uri_decorable("/blog/api/"));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let err = DecoratorStrategy::new(Vec::<String>::new(), ["("], Vec::<String>::new())
            .unwrap_err();
        assert!(matches!(err, PageSnapError::InvalidPattern { .. }));
    }
}
