//! WhaleCorp Telemetry - Observability Infrastructure
//!
//! Structured logging and Prometheus metrics for the API layer.

pub mod logging;
pub mod metrics;
pub mod middleware;

pub use logging::{init_logging, TelemetryConfig};
pub use metrics::{metrics_handler, WhaleCorpMetrics, METRICS};
pub use middleware::observability_middleware;
