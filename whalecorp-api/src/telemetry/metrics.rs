//! Prometheus Metrics Definitions
//!
//! Defines all WhaleCorp metrics with appropriate labels and types.
//! Exposes a /metrics endpoint for Prometheus scraping.

use axum::{http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_histogram_vec, CounterVec, Encoder, Gauge,
    HistogramVec, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
/// Covers: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Upstream fetch latency buckets (seconds), up to the fetch deadline.
const FETCH_LATENCY_BUCKETS: &[f64] = &[0.050, 0.100, 0.250, 0.500, 1.0, 2.0, 4.0, 7.5, 10.0];

/// Global metrics instance - initialized once at startup
pub static METRICS: Lazy<ApiResult<WhaleCorpMetrics>> = Lazy::new(WhaleCorpMetrics::new);

/// Container for all WhaleCorp metrics.
#[derive(Clone)]
pub struct WhaleCorpMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Live-status resolutions - labels: outcome (cache_hit/probed/probe_failed)
    pub live_status_total: CounterVec,

    /// Upstream page fetches - labels: result (ok/status/timeout/network/body/client)
    pub upstream_fetches_total: CounterVec,

    /// Upstream page fetch duration - labels: result
    pub upstream_fetch_duration_seconds: HistogramVec,

    /// Channels currently held in the liveness cache
    pub cached_channels: Gauge,
}

impl WhaleCorpMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "whalecorp_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_requests_total: {}", e)))?,

            http_request_duration_seconds: register_histogram_vec!(
                "whalecorp_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_request_duration_seconds: {}", e)))?,

            live_status_total: register_counter_vec!(
                "whalecorp_live_status_total",
                "Live-status requests by resolution",
                &["outcome"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register live_status_total: {}", e)))?,

            upstream_fetches_total: register_counter_vec!(
                "whalecorp_upstream_fetches_total",
                "Channel page fetches by result",
                &["result"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register upstream_fetches_total: {}", e)))?,

            upstream_fetch_duration_seconds: register_histogram_vec!(
                "whalecorp_upstream_fetch_duration_seconds",
                "Channel page fetch duration in seconds",
                &["result"],
                FETCH_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register upstream_fetch_duration_seconds: {}", e)))?,

            cached_channels: register_gauge!(
                "whalecorp_cached_channels",
                "Channels currently held in the liveness cache"
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register cached_channels: {}", e)))?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, status_str.as_str()])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    /// Record how a live-status request was resolved.
    pub fn record_live_status(&self, outcome: &str) {
        self.live_status_total.with_label_values(&[outcome]).inc();
    }

    /// Record one upstream fetch.
    pub fn record_upstream_fetch(&self, result: &str, duration_secs: f64) {
        self.upstream_fetches_total
            .with_label_values(&[result])
            .inc();
        self.upstream_fetch_duration_seconds
            .with_label_values(&[result])
            .observe(duration_secs);
    }

    pub fn set_cached_channels(&self, count: usize) {
        self.cached_channels.set(count as f64);
    }
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Observability",
    responses(
        (status = 200, description = "Prometheus metrics in text format", content_type = "text/plain"),
        (status = 500, description = "Failed to encode metrics"),
    ),
)]
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}
