//! Fan-out of one relay process per port mapping

use crate::config::{PortMapping, ProxySpec, Settings};
use crate::error::{RelayError, Result};
use crate::relay::{format_command, Relay};
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// How a relay ended
#[derive(Debug)]
pub enum RelayStatus {
    /// The relay process exited successfully
    Closed,
    /// The relay could not be started or exited with an error
    Failed(RelayError),
}

/// Final state of one mapping's relay
#[derive(Debug)]
pub struct RelayOutcome {
    pub mapping: PortMapping,
    pub status: RelayStatus,
}

impl RelayOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, RelayStatus::Closed)
    }
}

/// Runs one relay per mapping and waits for all of them
pub struct Forwarder<R> {
    settings: Settings,
    relay: Arc<R>,
}

impl<R: Relay> Forwarder<R> {
    pub fn new(settings: Settings, relay: R) -> Self {
        Self {
            settings,
            relay: Arc::new(relay),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Render the command line of every relay without running anything
    pub fn describe(&self) -> Vec<String> {
        let proxy = self.settings.proxy.as_ref();
        self.settings
            .mappings
            .iter()
            .map(|mapping| format_command(&self.relay.command(mapping, proxy)))
            .collect()
    }

    /// Launch every relay and wait until all of them have exited
    ///
    /// A failing relay is logged and reported in its outcome; it never
    /// stops its siblings and never turns into an error here.
    pub async fn run(self) -> Vec<RelayOutcome> {
        let Settings { mappings, proxy } = self.settings;
        let mut tasks = JoinSet::new();

        for mapping in mappings {
            let relay = Arc::clone(&self.relay);
            let proxy = proxy.clone();
            tasks.spawn(async move {
                let status = match forward(relay.as_ref(), &mapping, proxy.as_ref()).await {
                    Ok(()) => {
                        info!("Port forward for mapping {} closed without error", mapping);
                        RelayStatus::Closed
                    }
                    Err(e) => {
                        error!("Port forward for mapping {} failed: {}", mapping, e);
                        RelayStatus::Failed(e)
                    }
                };
                RelayOutcome { mapping, status }
            });
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => error!("Relay task did not complete: {}", e),
            }
        }

        outcomes
    }
}

/// Run the relay for one mapping until its process exits
///
/// Relay stderr is logged line by line as it arrives; only the last
/// non-empty line is kept for the failure report.
async fn forward<R: Relay + ?Sized>(
    relay: &R,
    mapping: &PortMapping,
    proxy: Option<&ProxySpec>,
) -> Result<()> {
    info!("Forwarding port {} ...", mapping);

    let mut cmd = relay.command(mapping, proxy);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());
    debug!("Relay command: {}", format_command(&cmd));

    let mut child = cmd.spawn().map_err(|source| RelayError::Spawn {
        program: cmd.as_std().get_program().to_string_lossy().into_owned(),
        source,
    })?;

    let mut last_line = String::new();
    if let Some(stderr) = child.stderr.take() {
        let mut lines = BufReader::new(stderr).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        warn!("Relay {}: {}", mapping, line);
                        last_line = line.to_string();
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    debug!("Stopped reading stderr of relay {}: {}", mapping, e);
                    break;
                }
            }
        }
    }

    let status = child.wait().await.map_err(RelayError::Wait)?;
    if status.success() {
        Ok(())
    } else {
        Err(RelayError::Exited {
            status,
            stderr: last_line,
        })
    }
}
