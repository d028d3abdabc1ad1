//! Constants for the WhaleCorp API
//!
//! Defaults for everything `ApiConfig` can override, plus the fixed request
//! headers sent to the streaming platform.

use std::time::Duration;

// ============================================================================
// SERVER
// ============================================================================

/// Default bind host
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

/// Default listening port
pub const DEFAULT_PORT: u16 = 3001;

/// Default CORS max age in seconds (24 hours)
pub const DEFAULT_CORS_MAX_AGE_SECS: u64 = 86400;

// ============================================================================
// UPSTREAM PROBE
// ============================================================================

/// Public channel pages live under this origin.
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://www.twitch.tv";

/// Hard deadline for one upstream page fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Desktop browser identity. Without a convincing header set the platform
/// serves reduced or blocked markup.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36";

pub const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9,es-ES;q=0.8";

pub const NO_CACHE: &str = "no-cache";
