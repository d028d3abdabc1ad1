//! Liveness verdicts

use serde::{Deserialize, Serialize};

use crate::detector::LiveSignal;
use crate::error::ProbeError;

/// Outcome of inspecting one channel page.
///
/// `reasons` is diagnostic only. It names every detection signal that fired,
/// or the upstream status / error that forced a negative verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LivenessResult {
    pub live: bool,
    pub reasons: Vec<String>,
}

impl LivenessResult {
    /// Build a verdict from the signals that fired, in check order.
    pub fn from_signals(signals: &[LiveSignal]) -> Self {
        Self {
            live: !signals.is_empty(),
            reasons: signals.iter().map(|s| s.reason().to_string()).collect(),
        }
    }

    /// Negative verdict for a non-2xx upstream response.
    pub fn upstream_status(status: u16) -> Self {
        Self {
            live: false,
            reasons: vec![format!("status:{}", status)],
        }
    }

    /// Negative verdict carrying a probe failure, for diagnostic output.
    pub fn from_probe_error(error: &ProbeError) -> Self {
        Self {
            live: false,
            reasons: vec![format!("error:{}", error)],
        }
    }
}
