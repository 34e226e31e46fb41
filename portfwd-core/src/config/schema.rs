//! Resolved forwarding settings

use std::fmt;

/// One concrete forward: listen on `local_port`, relay to `remote_host:remote_port`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortMapping {
    pub local_port: u16,
    pub remote_host: String,
    pub remote_port: u16,
}

impl PortMapping {
    pub fn new(local_port: u16, remote_host: impl Into<String>, remote_port: u16) -> Self {
        Self {
            local_port,
            remote_host: remote_host.into(),
            remote_port,
        }
    }
}

impl fmt::Display for PortMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.local_port, self.remote_host, self.remote_port)
    }
}

/// SOCKS4A endpoint every relay tunnels through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySpec {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for ProxySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Inclusive port range `start-end`, never empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    pub start: u16,
    pub end: u16,
}

impl PortRange {
    /// Number of ports covered
    pub fn count(&self) -> u32 {
        u32::from(self.end) - u32::from(self.start) + 1
    }

    pub fn ports(&self) -> std::ops::RangeInclusive<u16> {
        self.start..=self.end
    }
}

/// Fully validated settings
///
/// Only produced by a resolution pass without errors, so `mappings` is
/// never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub mappings: Vec<PortMapping>,
    pub proxy: Option<ProxySpec>,
}
