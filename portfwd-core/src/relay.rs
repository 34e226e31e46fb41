//! Relay command construction
//!
//! The actual byte shoveling is done by an external program. A [`Relay`]
//! only knows how to build the command line for one mapping; running it is
//! the forwarder's job.

use crate::config::{PortMapping, ProxySpec};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Builds the process that relays one mapping
pub trait Relay: Send + Sync + 'static {
    fn command(&self, mapping: &PortMapping, proxy: Option<&ProxySpec>) -> Command;
}

/// Relay backed by socat
#[derive(Debug, Clone)]
pub struct Socat {
    program: PathBuf,
}

impl Socat {
    pub const DEFAULT_PROGRAM: &'static str = "socat";

    /// Use the socat binary at `program`
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Convert a mapping into socat arguments
    ///
    /// `TCP-LISTEN:<local>,reuseaddr,fork` followed by either
    /// `TCP:<host>:<port>` or
    /// `SOCKS4A:<proxy>:<host>:<port>,socksport=<proxy port>`.
    pub fn args(&self, mapping: &PortMapping, proxy: Option<&ProxySpec>) -> Vec<OsString> {
        let listen = format!("TCP-LISTEN:{},reuseaddr,fork", mapping.local_port);
        let connect = match proxy {
            None => format!("TCP:{}:{}", mapping.remote_host, mapping.remote_port),
            Some(proxy) => format!(
                "SOCKS4A:{}:{}:{},socksport={}",
                proxy.host, mapping.remote_host, mapping.remote_port, proxy.port
            ),
        };

        vec![listen.into(), connect.into()]
    }
}

impl Default for Socat {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PROGRAM)
    }
}

impl Relay for Socat {
    fn command(&self, mapping: &PortMapping, proxy: Option<&ProxySpec>) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args(mapping, proxy));
        cmd
    }
}

/// Format a Command for display
pub fn format_command(cmd: &Command) -> String {
    let cmd = cmd.as_std();
    let program = cmd.get_program().to_string_lossy();
    let args: Vec<String> = cmd
        .get_args()
        .map(|arg| arg.to_string_lossy().to_string())
        .collect();
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}
