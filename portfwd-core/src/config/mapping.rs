//! Grammar for `[LOCAL:]REMOTE_HOST:REMOTE_PORT` mapping values
//!
//! `LOCAL` and `REMOTE_PORT` are each a port or an inclusive `start-end`
//! range. Whether the remote field is range syntax decides which grammar
//! applies: a remote range expands into one mapping per port, anything else
//! is parsed as a single port pair.

use super::schema::{PortMapping, PortRange};
use crate::error::{MappingError, PortSide, RangeError};

/// Parse a `start-end` range
///
/// Returns `Ok(None)` when `value` is not range syntax at all (no hyphen, or
/// more than one), so the caller can fall back to single-port parsing.
pub fn parse_range(value: &str) -> Result<Option<PortRange>, RangeError> {
    let Some((start, end)) = value.split_once('-') else {
        return Ok(None);
    };
    if end.contains('-') {
        return Ok(None);
    }

    let start: u16 = start.parse()?;
    let end: u16 = end.parse()?;
    if end < start {
        return Err(RangeError::NonSequential);
    }

    Ok(Some(PortRange { start, end }))
}

fn parse_port(value: &str, side: PortSide) -> Result<u16, MappingError> {
    value
        .parse()
        .map_err(|source| MappingError::InvalidPort { side, source })
}

/// Parse one mapping value into the forwards it describes
pub fn parse_mapping(value: &str) -> Result<Vec<PortMapping>, MappingError> {
    let fields: Vec<&str> = value.split(':').collect();
    let (local, host, remote) = match fields.as_slice() {
        [host, remote] => (None, *host, *remote),
        // An empty LOCAL field means "same as remote"
        [local, host, remote] => (Some(*local).filter(|l| !l.is_empty()), *host, *remote),
        fields if fields.len() < 2 => return Err(MappingError::MissingFields),
        fields => return Err(MappingError::TooManyFields(fields.len())),
    };

    if host.is_empty() {
        return Err(MappingError::EmptyHost);
    }

    let remote_range = parse_range(remote).map_err(|source| MappingError::InvalidRange {
        side: PortSide::Remote,
        source,
    })?;

    match remote_range {
        Some(remote_range) => expand_range(local, host, remote_range),
        None => {
            let remote_port = parse_port(remote, PortSide::Remote)?;
            let local_port = match local {
                Some(local) => parse_port(local, PortSide::Local)?,
                None => remote_port,
            };
            Ok(vec![PortMapping::new(local_port, host, remote_port)])
        }
    }
}

fn expand_range(
    local: Option<&str>,
    host: &str,
    remote_range: PortRange,
) -> Result<Vec<PortMapping>, MappingError> {
    let local_range = match local {
        None => remote_range,
        Some(local) => {
            let parsed = parse_range(local).map_err(|source| MappingError::InvalidRange {
                side: PortSide::Local,
                source,
            })?;
            match parsed {
                Some(local_range) if local_range.count() != remote_range.count() => {
                    return Err(MappingError::LengthMismatch {
                        local: local_range.count(),
                        remote: remote_range.count(),
                    });
                }
                Some(local_range) => local_range,
                // Not range syntax: the remote range is mirrored locally
                None => remote_range,
            }
        }
    };

    Ok(local_range
        .ports()
        .zip(remote_range.ports())
        .map(|(local_port, remote_port)| PortMapping::new(local_port, host, remote_port))
        .collect())
}
