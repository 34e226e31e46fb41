//! Command line arguments for the portfwd binary

use crate::relay::Socat;
use clap::Parser;
use std::path::PathBuf;

/// Forward TCP ports described by PORT* environment variables
///
/// Each PORT* variable holds `[LOCAL:]REMOTE_HOST:REMOTE_PORT`, where LOCAL
/// and REMOTE_PORT are a port or a `start-end` range. Set SOCKS_PROXY to
/// `HOST:PORT` to tunnel every forward through a SOCKS4A proxy.
#[derive(Parser, Debug)]
#[command(name = "portfwd", version)]
pub struct CliArgs {
    /// Relay program started once per port mapping
    #[arg(
        long,
        env = "FORWARDER_RELAY_BIN",
        value_name = "PATH",
        default_value = Socat::DEFAULT_PROGRAM
    )]
    pub relay_bin: PathBuf,

    /// Print the relay commands and exit without starting them
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,
}
