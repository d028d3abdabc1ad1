//! WhaleCorp API Server Entry Point
//!
//! Bootstraps configuration, wires the channel-page probe into the
//! live-status service, and starts the Axum HTTP server.

use std::sync::Arc;

use axum::Router;
use whalecorp_api::telemetry::{init_logging, TelemetryConfig};
use whalecorp_api::{
    create_api_router, ApiConfig, ApiError, ApiResult, AppState, ChannelPageProbe,
    UpstreamFetcher,
};
use whalecorp_core::{LiveStatusService, SystemClock};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_logging(&telemetry_config)?;

    let api_config = ApiConfig::from_env();

    let fetcher = UpstreamFetcher::new(api_config.fetch_timeout)?;
    let probe = ChannelPageProbe::new(fetcher, api_config.upstream_base_url.clone());
    let service = LiveStatusService::with_freshness_window(
        Arc::new(probe),
        Arc::new(SystemClock),
        api_config.freshness_window,
    );

    let app: Router = create_api_router(AppState::new(Arc::new(service)), &api_config);

    let addr = api_config.bind_addr()?;
    tracing::info!(
        %addr,
        upstream = %api_config.upstream_base_url,
        fetch_timeout_ms = api_config.fetch_timeout.as_millis() as u64,
        freshness_window_ms = api_config.freshness_window.as_millis() as u64,
        "Starting WhaleCorp API server"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
