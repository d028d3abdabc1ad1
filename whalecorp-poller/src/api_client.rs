//! REST client for the live-status endpoint.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL};
use serde_json::Value;
use std::sync::Arc;
use whalecorp_api::ApiError as ApiServerError;
use whalecorp_core::Clock;

use crate::config::PollerConfig;

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

/// Where the poller gets one channel's status from.
///
/// The body is kept as raw JSON; interpretation is tolerant of several
/// backend shapes (see [`crate::aggregator::is_json_live`]).
#[async_trait]
pub trait ChannelStatusSource: Send + Sync {
    async fn fetch_status(&self, login: &str) -> Result<Value, ApiClientError>;
}

#[derive(Clone)]
pub struct ProbeClient {
    client: reqwest::Client,
    probe_url: String,
    clock: Arc<dyn Clock>,
}

impl ProbeClient {
    pub fn new(config: &PollerConfig, clock: Arc<dyn Clock>) -> Result<Self, ApiClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            probe_url: format!(
                "{}{}",
                config.api_base_url.trim_end_matches('/'),
                config.probe_path
            ),
            clock,
        })
    }

    pub fn probe_url(&self) -> &str {
        &self.probe_url
    }

    /// Query for one channel. Both `channel` and `login` are sent so either
    /// backend spelling works; `_` defeats intermediate caches.
    fn status_query(&self, login: &str) -> [(&'static str, String); 3] {
        [
            ("channel", login.to_string()),
            ("login", login.to_string()),
            ("_", self.clock.now_millis().to_string()),
        ]
    }

    async fn get_json<T, Q>(&self, query: &Q) -> Result<T, ApiClientError>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let response = self
            .client
            .get(&self.probe_url)
            .query(query)
            .send()
            .await?;
        self.parse_response(response).await
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiClientError> {
        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            Ok(serde_json::from_str::<T>(&text)?)
        } else {
            if let Ok(api_error) = serde_json::from_str::<ApiServerError>(&text) {
                return Err(ApiClientError::InvalidResponse(format!(
                    "{}: {}",
                    api_error.code, api_error.message
                )));
            }
            Err(ApiClientError::InvalidResponse(format!(
                "HTTP {}: {}",
                status.as_u16(),
                text
            )))
        }
    }
}

#[async_trait]
impl ChannelStatusSource for ProbeClient {
    async fn fetch_status(&self, login: &str) -> Result<Value, ApiClientError> {
        self.get_json(&self.status_query(login)).await
    }
}
