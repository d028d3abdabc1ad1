//! Upstream probe seam
//!
//! The live-status service never talks to the network directly. It calls a
//! [`LivenessProbe`], which the API crate implements over HTTP and tests
//! replace with scripted stubs.

use async_trait::async_trait;

use crate::channel::ChannelId;
use crate::error::ProbeError;
use crate::liveness::LivenessResult;

/// One upstream liveness check for a channel (fetch + detect).
///
/// Implementations fold upstream HTTP error statuses into a negative
/// [`LivenessResult`]; only failures that prevent any verdict are returned as
/// [`ProbeError`].
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    async fn probe(&self, channel: &ChannelId) -> Result<LivenessResult, ProbeError>;
}
