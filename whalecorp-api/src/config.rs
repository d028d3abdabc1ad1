//! API Configuration Module
//!
//! Server, CORS and upstream-probe settings. Configuration is loaded from
//! environment variables; every value defaults to the constant in
//! [`crate::constants`].

use std::net::SocketAddr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_BIND_HOST, DEFAULT_CORS_MAX_AGE_SECS, DEFAULT_FETCH_TIMEOUT, DEFAULT_PORT,
    DEFAULT_UPSTREAM_BASE_URL,
};
use crate::error::{ApiError, ApiResult};
use whalecorp_core::FRESHNESS_WINDOW;

// ============================================================================
// API CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct ApiConfig {
    // ========================================================================
    // Server
    // ========================================================================
    pub bind_host: String,

    /// Raw port value, validated by [`ApiConfig::bind_addr`].
    pub port: String,

    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins.
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    // ========================================================================
    // Upstream Probe
    // ========================================================================
    /// Origin that serves public channel pages.
    pub upstream_base_url: String,

    /// Deadline for one channel-page fetch, body included.
    pub fetch_timeout: Duration,

    /// How long a cached verdict is served without re-probing.
    pub freshness_window: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: DEFAULT_BIND_HOST.to_string(),
            port: DEFAULT_PORT.to_string(),
            cors_origins: Vec::new(),
            cors_max_age_secs: DEFAULT_CORS_MAX_AGE_SECS,
            upstream_base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            freshness_window: FRESHNESS_WINDOW,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `WHALECORP_API_BIND`: Bind host (default: 0.0.0.0)
    /// - `PORT` or `WHALECORP_API_PORT`: Listening port (default: 3001)
    /// - `WHALECORP_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `WHALECORP_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `WHALECORP_UPSTREAM_BASE_URL`: Channel page origin (default: https://www.twitch.tv)
    /// - `WHALECORP_FETCH_TIMEOUT_MS`: Upstream fetch deadline (default: 10000)
    /// - `WHALECORP_FRESHNESS_WINDOW_MS`: Cache freshness window (default: 20000)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparseable numbers fall back to
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let cors_origins = lookup("WHALECORP_CORS_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let millis = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(default)
        };

        Self {
            bind_host: lookup("WHALECORP_API_BIND").unwrap_or(defaults.bind_host),
            port: lookup("PORT")
                .or_else(|| lookup("WHALECORP_API_PORT"))
                .unwrap_or(defaults.port),
            cors_origins,
            cors_max_age_secs: lookup("WHALECORP_CORS_MAX_AGE_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.cors_max_age_secs),
            upstream_base_url: lookup("WHALECORP_UPSTREAM_BASE_URL")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.upstream_base_url),
            fetch_timeout: millis("WHALECORP_FETCH_TIMEOUT_MS", defaults.fetch_timeout),
            freshness_window: millis("WHALECORP_FRESHNESS_WINDOW_MS", defaults.freshness_window),
        }
    }

    /// Resolve the socket address to listen on.
    pub fn bind_addr(&self) -> ApiResult<SocketAddr> {
        let port = self
            .port
            .trim()
            .parse::<u16>()
            .map_err(|_| ApiError::invalid_format("PORT", "a port number between 0 and 65535"))?;

        let addr = format!("{}:{}", self.bind_host, port);
        addr.parse::<SocketAddr>().map_err(|e| {
            ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e))
        })
    }
}
