//! Host pattern compilation
//!
//! Route hosts such as `sonata-project.{tld}` are compiled into anchored,
//! case-insensitive regexes. Each `{var}` placeholder takes its pattern from
//! the route requirements, defaulting to a single DNS label.

use std::collections::BTreeMap;

use regex::Regex;

use crate::errors::{PageSnapError, Result};
use crate::model::Route;

/// Pattern used for a host variable without a requirement
pub const DEFAULT_HOST_VARIABLE_PATTERN: &str = "[^.]+";

/// Compile a host pattern into a regex matching whole host names
pub fn compile(pattern: &str, requirements: &BTreeMap<String, String>) -> Result<Regex> {
    let invalid = |reason: &str| PageSnapError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: reason.to_string(),
    };

    let mut source = String::from("(?i)^");
    let mut rest = pattern;
    while let Some(open) = rest.find('{') {
        source.push_str(&regex::escape(&rest[..open]));
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| invalid("unclosed '{'"))?;
        let name = &after[..close];
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(invalid("variable names must be alphanumeric"));
        }
        let requirement = requirements
            .get(name)
            .map(|r| r.trim_start_matches('^').trim_end_matches('$'))
            .unwrap_or(DEFAULT_HOST_VARIABLE_PATTERN);
        source.push_str(&format!("(?P<{}>{})", name, requirement));
        rest = &after[close + 1..];
    }
    if rest.contains('}') {
        return Err(invalid("unmatched '}'"));
    }
    source.push_str(&regex::escape(rest));
    source.push('$');

    Regex::new(&source).map_err(|e| invalid(&e.to_string()))
}

/// Whether the route may be served on the given host
///
/// Routes without a host pattern match every host.
pub fn route_matches_host(route: &Route, host: &str) -> Result<bool> {
    match &route.host {
        None => Ok(true),
        Some(pattern) => Ok(compile(pattern, &route.requirements)?.is_match(host)),
    }
}
