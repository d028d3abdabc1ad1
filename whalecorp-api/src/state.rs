//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use whalecorp_core::LiveStatusService;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Liveness cache, probe and clock. One per process.
    pub live_status: Arc<LiveStatusService>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(live_status: Arc<LiveStatusService>) -> Self {
        Self {
            live_status,
            start_time: Instant::now(),
        }
    }
}

crate::impl_from_ref!(Arc<LiveStatusService>, live_status);
