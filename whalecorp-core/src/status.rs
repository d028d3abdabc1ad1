//! Live-status policy
//!
//! [`LiveStatusService`] owns the liveness cache together with the injected
//! probe and clock. It backs both HTTP surfaces:
//!
//! - the primary status path, which serves fresh cache hits, refreshes on
//!   miss/stale/force, and turns probe failure into a `probe_failed` value;
//! - the diagnostic path, which always probes and reports the reasons.
//!
//! Both go through the same [`LiveStatusService::refresh`] call.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{LivenessCache, FRESHNESS_WINDOW};
use crate::channel::ChannelId;
use crate::clock::Clock;
use crate::error::ProbeError;
use crate::liveness::LivenessResult;
use crate::probe::LivenessProbe;

/// Error marker returned on the primary path when a probe fails.
pub const PROBE_FAILED: &str = "probe_failed";

// ============================================================================
// RESPONSE TYPES
// ============================================================================

/// Primary live-status response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LiveStatus {
    pub channel: ChannelId,
    pub live: bool,
    /// Present (and `true`) only when served from the cache.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
    /// Present only when the probe failed; always [`PROBE_FAILED`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Diagnostic live-status response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LiveDebug {
    pub channel: ChannelId,
    pub live: bool,
    pub reasons: Vec<String>,
}

/// How a primary live-status request was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveStatusOutcome {
    /// Served from a fresh cache entry.
    Cached { live: bool },
    /// Freshly probed; the cache now holds this result.
    Probed(LivenessResult),
    /// The probe failed; the cache was left untouched.
    Failed(ProbeError),
}

impl LiveStatusOutcome {
    pub fn live(&self) -> bool {
        match self {
            LiveStatusOutcome::Cached { live } => *live,
            LiveStatusOutcome::Probed(result) => result.live,
            LiveStatusOutcome::Failed(_) => false,
        }
    }

    /// Metrics/log label for this outcome.
    pub fn label(&self) -> &'static str {
        match self {
            LiveStatusOutcome::Cached { .. } => "cache_hit",
            LiveStatusOutcome::Probed(_) => "probed",
            LiveStatusOutcome::Failed(_) => "probe_failed",
        }
    }

    /// Render the primary response body. Never fails.
    pub fn into_status(self, channel: ChannelId) -> LiveStatus {
        match self {
            LiveStatusOutcome::Cached { live } => LiveStatus {
                channel,
                live,
                cached: Some(true),
                error: None,
            },
            LiveStatusOutcome::Probed(result) => LiveStatus {
                channel,
                live: result.live,
                cached: None,
                error: None,
            },
            LiveStatusOutcome::Failed(_) => LiveStatus {
                channel,
                live: false,
                cached: None,
                error: Some(PROBE_FAILED.to_string()),
            },
        }
    }
}

// ============================================================================
// SERVICE
// ============================================================================

/// Cache + probe + clock, constructed once per process and shared by `Arc`.
pub struct LiveStatusService {
    cache: LivenessCache,
    probe: Arc<dyn LivenessProbe>,
    clock: Arc<dyn Clock>,
}

impl LiveStatusService {
    pub fn new(probe: Arc<dyn LivenessProbe>, clock: Arc<dyn Clock>) -> Self {
        Self::with_freshness_window(probe, clock, FRESHNESS_WINDOW)
    }

    pub fn with_freshness_window(
        probe: Arc<dyn LivenessProbe>,
        clock: Arc<dyn Clock>,
        freshness_window: Duration,
    ) -> Self {
        Self {
            cache: LivenessCache::new(freshness_window),
            probe,
            clock,
        }
    }

    pub fn cache(&self) -> &LivenessCache {
        &self.cache
    }

    /// Resolve the primary live status for `channel`.
    ///
    /// `force` skips the cache lookup but still records the new result.
    pub async fn live_status(&self, channel: &ChannelId, force: bool) -> LiveStatusOutcome {
        let now = self.clock.now_millis();

        if !force {
            if let Some(entry) = self.cache.get_fresh(channel, now) {
                return LiveStatusOutcome::Cached { live: entry.live };
            }
        }

        match self.refresh(channel, now).await {
            Ok(result) => LiveStatusOutcome::Probed(result),
            Err(error) => LiveStatusOutcome::Failed(error),
        }
    }

    /// Probe `channel` unconditionally and report every reason.
    pub async fn live_debug(&self, channel: &ChannelId) -> LiveDebug {
        let now = self.clock.now_millis();
        let result = self
            .refresh(channel, now)
            .await
            .unwrap_or_else(|error| LivenessResult::from_probe_error(&error));

        LiveDebug {
            channel: channel.clone(),
            live: result.live,
            reasons: result.reasons,
        }
    }

    /// Run the probe and, on success, overwrite the cache entry with the
    /// result stamped at `now` (the request time, not the completion time).
    async fn refresh(&self, channel: &ChannelId, now: i64) -> Result<LivenessResult, ProbeError> {
        let result = self.probe.probe(channel).await?;
        self.cache.put(channel.clone(), &result, now);
        Ok(result)
    }
}
