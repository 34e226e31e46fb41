//! Configuration for portfwd
//!
//! This module turns an environment snapshot into forwarding settings:
//! - schema: PortMapping, ProxySpec and Settings
//! - mapping / proxy: value grammars
//! - resolver: per-key aggregation into Settings or a list of errors

pub mod mapping;
pub mod proxy;
pub mod resolver;
pub mod schema;

// Re-export commonly used types
pub use mapping::{parse_mapping, parse_range};
pub use proxy::parse_proxy;
pub use resolver::{collect_mappings, resolve, resolve_proxy, MAPPING_PREFIX, PROXY_KEY};
pub use schema::{PortMapping, PortRange, ProxySpec, Settings};
