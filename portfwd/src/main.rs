//! Environment-driven TCP port forwarder

use anyhow::Result;
use clap::Parser;
use portfwd_core::{resolve, CliArgs, Environment, Forwarder, Socat};
use tracing_subscriber::filter::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    // FORWARDER_LOG wins over --verbose
    let env_filter = EnvFilter::try_from_env("FORWARDER_LOG")
        .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    let settings = match resolve(&Environment::from_process()) {
        Ok(settings) => settings,
        Err(errors) => {
            eprintln!("Invalid port mapping/s found:");
            for error in &errors {
                eprintln!("{error}");
            }
            std::process::exit(1);
        }
    };

    let forwarder = Forwarder::new(settings, Socat::new(args.relay_bin));

    if args.dry_run {
        for line in forwarder.describe() {
            println!("{line}");
        }
        return Ok(());
    }

    if let Some(proxy) = &forwarder.settings().proxy {
        tracing::info!("Tunneling all forwards through SOCKS4A proxy {}", proxy);
    }

    let outcomes = forwarder.run().await;
    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    tracing::info!(
        "All {} relays exited ({} failed)",
        outcomes.len(),
        failed
    );

    Ok(())
}
