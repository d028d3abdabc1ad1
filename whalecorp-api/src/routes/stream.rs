//! Stream Liveness Endpoints
//!
//! - GET /api/stream/live-status - cached verdict for the widget
//! - GET /api/stream/live-debug - forced probe with detection reasons
//!
//! Both accept `channel` (or `login` as a fallback). Probe failures are
//! reported in a `200` body, never as an HTTP error.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use utoipa::IntoParams;
use whalecorp_core::{ChannelId, LiveDebug, LiveStatus, LiveStatusOutcome, LiveStatusService};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::telemetry::METRICS;

// ============================================================================
// QUERY
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StreamQuery {
    /// Channel login handle
    pub channel: Option<String>,
    /// Used when `channel` is absent or empty
    pub login: Option<String>,
    /// `1` skips the cache lookup (live-status only)
    pub force: Option<String>,
}

impl StreamQuery {
    /// Build from raw query pairs. A repeated key keeps its first value.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "channel" => &mut query.channel,
                "login" => &mut query.login,
                "force" => &mut query.force,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }

    /// Canonical channel from `channel`, falling back to `login` when
    /// `channel` is missing or empty.
    pub fn channel_id(&self) -> ApiResult<ChannelId> {
        let raw = self
            .channel
            .as_deref()
            .filter(|c| !c.is_empty())
            .or(self.login.as_deref())
            .unwrap_or_default();
        ChannelId::parse(raw).map_err(|_| ApiError::missing_field("channel"))
    }

    pub fn is_forced(&self) -> bool {
        self.force.as_deref() == Some("1")
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /api/stream/live-status
#[utoipa::path(
    get,
    path = "/api/stream/live-status",
    tag = "Stream",
    params(StreamQuery),
    responses(
        (status = 200, description = "Liveness verdict (probe failures included)", body = LiveStatus),
        (status = 400, description = "No channel given", body = ApiError),
    ),
)]
pub async fn live_status(
    State(service): State<Arc<LiveStatusService>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ApiResult<Json<LiveStatus>> {
    let Query(pairs) = query?;
    let query = StreamQuery::from_pairs(pairs);
    let channel = query.channel_id()?;

    let outcome = service.live_status(&channel, query.is_forced()).await;
    if let LiveStatusOutcome::Failed(error) = &outcome {
        tracing::warn!(
            channel = %channel,
            kind = error.kind(),
            error = %error,
            "Live-status probe failed"
        );
    }

    if let Ok(metrics) = METRICS.as_ref() {
        metrics.record_live_status(outcome.label());
        metrics.set_cached_channels(service.cache().len());
    }

    Ok(Json(outcome.into_status(channel)))
}

/// GET /api/stream/live-debug
#[utoipa::path(
    get,
    path = "/api/stream/live-debug",
    tag = "Stream",
    params(StreamQuery),
    responses(
        (status = 200, description = "Fresh probe with every reason", body = LiveDebug),
        (status = 400, description = "No channel given", body = ApiError),
    ),
)]
pub async fn live_debug(
    State(service): State<Arc<LiveStatusService>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ApiResult<Json<LiveDebug>> {
    let Query(pairs) = query?;
    let channel = StreamQuery::from_pairs(pairs).channel_id()?;

    let report = service.live_debug(&channel).await;
    tracing::debug!(
        channel = %channel,
        live = report.live,
        reasons = ?report.reasons,
        "Live-debug probe"
    );

    Ok(Json(report))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/live-status", get(live_status))
        .route("/live-debug", get(live_debug))
}
