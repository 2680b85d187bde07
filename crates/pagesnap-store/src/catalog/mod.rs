//! Routing config (route catalog)
//!
//! Provides:
//! - Routing config format v0 (YAML)
//! - Parser with validation
//! - `RouteCatalog` implementation over the parsed config

mod format;
mod parser;

pub use format::{DecoratorConfig, RouteEntry, RoutingConfigV0};
pub use parser::{parse_routing_file, parse_routing_str};
