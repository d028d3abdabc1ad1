//! Error types for WhaleCorp liveness operations

use thiserror::Error;

/// Errors raised while building domain values from untrusted input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Channel identifier is empty")]
    EmptyChannel,
}

/// A probe attempt that could not produce a liveness verdict.
///
/// Upstream HTTP error statuses are NOT probe errors: they are folded into a
/// negative [`crate::LivenessResult`] by the probe itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProbeError {
    #[error("upstream did not respond within {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to read upstream body: {0}")]
    Body(String),

    #[error("unexpected probe failure: {0}")]
    Unexpected(String),
}

impl ProbeError {
    /// Short, stable label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeError::Timeout { .. } => "timeout",
            ProbeError::Network(_) => "network",
            ProbeError::Body(_) => "body",
            ProbeError::Unexpected(_) => "unexpected",
        }
    }
}

/// Result alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
