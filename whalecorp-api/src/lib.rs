//! WhaleCorp API - Stream Liveness Service
//!
//! REST endpoints (Axum) answering "is this channel live right now?" for the
//! WhaleCorp widget. Verdicts come from scraping the public channel page and
//! are cached per channel by `whalecorp-core`.

pub mod config;
pub mod constants;
pub mod error;
pub mod fetcher;
pub mod macros;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod upstream;

// Re-export commonly used types
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use fetcher::{FetchError, FetchedPage, UpstreamFetcher};
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use state::AppState;
pub use upstream::ChannelPageProbe;
