//! WhaleCorp poller entry point.
//!
//! Polls the configured channels and prints the live list as one JSON line
//! per cycle whenever at least one channel is live.

use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use whalecorp_core::SystemClock;
use whalecorp_poller::{LiveSnapshot, Poller, PollerConfig};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = PollerConfig::load()?;
    let poller = Poller::from_config(&config, Arc::new(SystemClock))?;

    tracing::info!(
        api = %config.api_base_url,
        channels = ?poller.channels(),
        interval_ms = config.poll_interval_ms,
        "Starting WhaleCorp poller"
    );

    let handle = poller.spawn(true);
    let mut snapshots = handle.snapshots();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if let Some(snapshot) = snapshot {
                    render(&snapshot)?;
                }
            }
        }
    }

    handle.shutdown().await?;
    Ok(())
}

fn render(snapshot: &LiveSnapshot) -> color_eyre::Result<()> {
    if snapshot.should_render() {
        println!("{}", serde_json::to_string(&snapshot.live_channels)?);
    } else {
        tracing::info!(polled = snapshot.reports.len(), "No channels live");
    }
    Ok(())
}
