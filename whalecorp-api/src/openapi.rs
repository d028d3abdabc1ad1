//! OpenAPI Specification for WhaleCorp API
//!
//! Generated by utoipa from the handler annotations and response types.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::{health, stream};
use crate::telemetry::metrics;
use whalecorp_core::{LiveDebug, LiveStatus};

/// OpenAPI document for WhaleCorp API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "WhaleCorp Live API",
        version = "0.4.0",
        description = "Live-now probe behind the WhaleCorp stream widget",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
        contact(name = "WhaleCorp", url = "https://whalecorp.gg")
    ),
    servers(
        (url = "http://localhost:3001", description = "Local Development")
    ),
    tags(
        (name = "Stream", description = "Channel liveness"),
        (name = "Health", description = "Kubernetes-style health checks"),
        (name = "Observability", description = "Prometheus metrics")
    ),
    paths(
        stream::live_status,
        stream::live_debug,
        health::ping,
        health::liveness,
        health::readiness,
        metrics::metrics_handler,
    ),
    components(schemas(
        LiveStatus,
        LiveDebug,
        ApiError,
        ErrorCode,
        health::HealthResponse,
        health::HealthStatus,
        health::HealthDetails,
        health::CacheHealth,
    ))
)]
pub struct ApiDoc;
