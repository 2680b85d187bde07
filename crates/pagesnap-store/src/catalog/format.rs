//! Routing config format v0
//!
//! YAML description of the route catalog and the decorator strategy

use std::collections::BTreeMap;

use pagesnap_core::errors::Result as CoreResult;
use pagesnap_core::model::{Route, RouteCollection};
use pagesnap_core::ops::RouteCatalog;
use pagesnap_core::routing::DecoratorStrategy;
use serde::{Deserialize, Serialize};

/// Top-level routing config structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfigV0 {
    /// Schema version (must be 0 for this format)
    pub schema_version: u32,

    /// Status codes that get an internal error page per site
    #[serde(default)]
    pub http_error_codes: Vec<u16>,

    #[serde(default)]
    pub decorator: DecoratorConfig,

    /// Routes in declaration order
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
}

/// Routes excluded from page binding
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecoratorConfig {
    #[serde(default)]
    pub ignore_routes: Vec<String>,

    #[serde(default)]
    pub ignore_route_patterns: Vec<String>,

    #[serde(default)]
    pub ignore_uri_patterns: Vec<String>,
}

/// One named route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteEntry {
    pub name: String,
    pub path: String,

    /// Host pattern, e.g. `sonata-project.{tld}`
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub requirements: BTreeMap<String, String>,

    #[serde(default)]
    pub defaults: BTreeMap<String, String>,
}

impl RouteEntry {
    pub fn to_route(&self) -> Route {
        let mut route = Route::new(&self.path);
        route.host = self.host.clone();
        route.requirements = self.requirements.clone();
        route.defaults = self.defaults.clone();
        route
    }
}

impl RoutingConfigV0 {
    pub fn to_route_collection(&self) -> RouteCollection {
        let mut routes = RouteCollection::new();
        for entry in &self.routes {
            routes.add(entry.name.trim(), entry.to_route());
        }
        routes
    }

    /// Compile the decorator section
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` for an ignore pattern that is not a valid regex.
    pub fn decorator_strategy(&self) -> CoreResult<DecoratorStrategy> {
        DecoratorStrategy::new(
            self.decorator.ignore_routes.iter().cloned(),
            &self.decorator.ignore_route_patterns,
            &self.decorator.ignore_uri_patterns,
        )
    }
}

impl RouteCatalog for RoutingConfigV0 {
    fn route_collection(&self) -> CoreResult<RouteCollection> {
        Ok(self.to_route_collection())
    }
}
