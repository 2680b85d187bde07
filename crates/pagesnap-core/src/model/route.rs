use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::page::DEFAULT_REQUEST_METHOD;

/// A named route as declared by the routing table
///
/// Paths always start with `/`. The host pattern may contain `{var}`
/// placeholders constrained by `requirements[var]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub requirements: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub defaults: BTreeMap<String, String>,
}

impl Route {
    pub fn new(path: impl AsRef<str>) -> Self {
        Self {
            path: normalize_path(path.as_ref()),
            host: None,
            requirements: BTreeMap::new(),
            defaults: BTreeMap::new(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_requirement(mut self, key: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.requirements.insert(key.into(), pattern.into());
        self
    }

    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    /// Allowed HTTP methods, `|`-separated, as stored on pages
    pub fn request_method(&self) -> &str {
        self.requirements
            .get("_method")
            .map(String::as_str)
            .unwrap_or(DEFAULT_REQUEST_METHOD)
    }

    /// Locale constraint of the route, if any
    pub fn locale_requirement(&self) -> Option<&str> {
        self.requirements.get("_locale").map(String::as_str)
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Insertion-ordered collection of named routes
///
/// Iteration order is the order routes were added; re-adding a name
/// replaces the route and moves it to the end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteCollection {
    routes: Vec<(String, Route)>,
}

impl RouteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, route: Route) {
        let name = name.into();
        self.routes.retain(|(existing, _)| *existing != name);
        self.routes.push((name, route));
    }

    pub fn get(&self, name: &str) -> Option<&Route> {
        self.routes
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, route)| route)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Route)> {
        self.routes.iter().map(|(name, route)| (name.as_str(), route))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl FromIterator<(String, Route)> for RouteCollection {
    fn from_iter<I: IntoIterator<Item = (String, Route)>>(iter: I) -> Self {
        let mut collection = RouteCollection::new();
        for (name, route) in iter {
            collection.add(name, route);
        }
        collection
    }
}
