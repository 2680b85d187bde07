//! Routing config parser with validation
//!
//! Parses YAML and validates schema version, route name uniqueness and
//! pattern syntax

#![allow(clippy::result_large_err)]

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use pagesnap_core::routing::host_pattern;
use regex::Regex;

use crate::catalog::format::RoutingConfigV0;
use crate::errors::{io_error, routing_config_validation, Result};

/// Parse a routing config file from a path
pub fn parse_routing_file(path: &Path) -> Result<RoutingConfigV0> {
    let content = fs::read_to_string(path).map_err(|e| io_error("routing_config_read", e))?;
    let config = parse_routing_str(&content)?;
    tracing::debug!(
        path = %path.display(),
        routes = config.routes.len(),
        "routing config loaded"
    );
    Ok(config)
}

/// Parse a routing config from a string
pub fn parse_routing_str(content: &str) -> Result<RoutingConfigV0> {
    let config: RoutingConfigV0 = serde_yaml::from_str(content)
        .map_err(|e| routing_config_validation(&format!("YAML parse error: {}", e)))?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_config(config: &RoutingConfigV0) -> Result<()> {
    if config.schema_version != 0 {
        return Err(routing_config_validation(&format!(
            "Unsupported schema_version: {}. Expected 0",
            config.schema_version
        )));
    }

    if let Some(code) = config
        .http_error_codes
        .iter()
        .find(|code| !(100..=599).contains(*code))
    {
        return Err(routing_config_validation(&format!(
            "Invalid HTTP status code {}",
            code
        )));
    }

    let mut names = HashSet::new();
    for entry in &config.routes {
        let name = entry.name.trim();
        if name.is_empty() {
            return Err(routing_config_validation("Route name must not be empty"));
        }
        if !names.insert(name) {
            return Err(routing_config_validation(&format!(
                "Duplicate route name '{}'",
                name
            )));
        }
        if entry.path.trim().is_empty() {
            return Err(routing_config_validation(&format!(
                "Route '{}' has an empty path",
                name
            )));
        }

        for (key, requirement) in &entry.requirements {
            Regex::new(requirement).map_err(|e| {
                routing_config_validation(&format!(
                    "Route '{}' requirement '{}' is not a valid pattern: {}",
                    name, key, e
                ))
            })?;
        }

        if let Some(host) = &entry.host {
            host_pattern::compile(host, &entry.requirements).map_err(|e| {
                routing_config_validation(&format!("Route '{}': {}", name, e))
            })?;
        }
    }

    config
        .decorator_strategy()
        .map_err(|e| routing_config_validation(&e.to_string()))?;

    Ok(())
}
