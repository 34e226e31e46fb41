//! Grammar for the `HOST:PORT` SOCKS4A proxy value

use super::schema::ProxySpec;
use crate::error::ProxySpecError;

/// Parse a proxy value; empty means no proxy
pub fn parse_proxy(value: &str) -> Result<Option<ProxySpec>, ProxySpecError> {
    if value.is_empty() {
        return Ok(None);
    }

    let Some((host, port)) = value.split_once(':') else {
        return Err(ProxySpecError::Format);
    };
    if port.contains(':') {
        return Err(ProxySpecError::Format);
    }
    if host.is_empty() {
        return Err(ProxySpecError::EmptyHost);
    }

    let port = port.parse().map_err(ProxySpecError::InvalidPort)?;
    Ok(Some(ProxySpec {
        host: host.to_string(),
        port,
    }))
}
