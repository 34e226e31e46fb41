//! Error types for mapping resolution and relay execution

use std::fmt;
use std::num::ParseIntError;
use std::process::ExitStatus;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RelayError>;

/// Which side of a mapping a port field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortSide {
    Local,
    Remote,
}

impl fmt::Display for PortSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortSide::Local => f.write_str("LOCAL"),
            PortSide::Remote => f.write_str("REMOTE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error(transparent)]
    Parse(#[from] ParseIntError),

    #[error("non-sequential range")]
    NonSequential,
}

/// Why a single `[LOCAL:]REMOTE_HOST:REMOTE_PORT` value was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("should at least contain REMOTE_HOST:REMOTE_PORT")]
    MissingFields,

    #[error("too many fields ({0}), expected [LOCAL:]REMOTE_HOST:REMOTE_PORT")]
    TooManyFields(usize),

    #[error("REMOTE host is empty")]
    EmptyHost,

    #[error("invalid {side} port: {source}")]
    InvalidPort {
        side: PortSide,
        #[source]
        source: ParseIntError,
    },

    #[error("could not parse {side} port range: {source}")]
    InvalidRange {
        side: PortSide,
        #[source]
        source: RangeError,
    },

    #[error("the port ranges do not have the same length on local/remote (local={local} remote={remote})")]
    LengthMismatch { local: u32, remote: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProxySpecError {
    #[error("must be in format 'host:port'")]
    Format,

    #[error("proxy host is empty")]
    EmptyHost,

    #[error("invalid port: {0}")]
    InvalidPort(#[source] ParseIntError),
}

/// One problem found while resolving the environment
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("invalid port mapping \"{key}={value}\": {source}")]
    Mapping {
        key: String,
        value: String,
        #[source]
        source: MappingError,
    },

    #[error("invalid socks proxy \"{key}={value}\": {source}")]
    Proxy {
        key: String,
        value: String,
        #[source]
        source: ProxySpecError,
    },

    #[error("no ports defined")]
    NoPorts,
}

impl ResolveError {
    /// Environment key the error was raised for, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            ResolveError::Mapping { key, .. } | ResolveError::Proxy { key, .. } => Some(key),
            ResolveError::NoPorts => None,
        }
    }

    /// Raw value of the offending key, if any
    pub fn value(&self) -> Option<&str> {
        match self {
            ResolveError::Mapping { value, .. } | ResolveError::Proxy { value, .. } => Some(value),
            ResolveError::NoPorts => None,
        }
    }
}

/// Every error from a failed resolution pass
///
/// Never empty: a pass with no errors produces settings instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveErrors(Vec<ResolveError>);

impl ResolveErrors {
    pub(crate) fn new(errors: Vec<ResolveError>) -> Self {
        debug_assert!(!errors.is_empty());
        Self(errors)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResolveError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<ResolveError> {
        self.0
    }
}

impl fmt::Display for ResolveErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ResolveErrors {}

impl<'a> IntoIterator for &'a ResolveErrors {
    type Item = &'a ResolveError;
    type IntoIter = std::slice::Iter<'a, ResolveError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for ResolveErrors {
    type Item = ResolveError;
    type IntoIter = std::vec::IntoIter<ResolveError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Failure of a single relay process
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Failed to spawn relay {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to wait for relay: {0}")]
    Wait(#[source] std::io::Error),

    /// `stderr` holds the last line the relay wrote there
    #[error("Relay exited with {status}{}", stderr_suffix(.stderr))]
    Exited { status: ExitStatus, stderr: String },
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}
