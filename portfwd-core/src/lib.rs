//! Core library for portfwd
//!
//! Resolves `PORT*` / `SOCKS_PROXY` environment variables into validated
//! port mappings and runs one relay process per mapping.

pub mod args;
pub mod config;
pub mod env;
pub mod error;
pub mod forwarder;
pub mod relay;

pub use args::CliArgs;
pub use config::{resolve, PortMapping, ProxySpec, Settings};
pub use env::Environment;
pub use error::{ResolveError, ResolveErrors, RelayError, Result};
pub use forwarder::{Forwarder, RelayOutcome, RelayStatus};
pub use relay::{Relay, Socat};
