//! Deadline-bounded HTTP fetch
//!
//! [`UpstreamFetcher`] issues a GET and races the whole exchange, headers and
//! body, against a fixed deadline. When the deadline wins the in-flight
//! request future is dropped, which closes the connection.

use std::time::{Duration, Instant};

use reqwest::header::HeaderMap;
use reqwest::Client;
use thiserror::Error;
use whalecorp_core::ProbeError;

/// Status and full body of a completed fetch. Any status is a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    /// Metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Timeout { .. } => "timeout",
            FetchError::Request(_) => "network",
            FetchError::Body(_) => "body",
            FetchError::Client(_) => "client",
        }
    }
}

impl From<FetchError> for ProbeError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Timeout { after_ms } => ProbeError::Timeout { after_ms },
            FetchError::Request(e) => ProbeError::Network(e.to_string()),
            FetchError::Body(e) => ProbeError::Body(e.to_string()),
            FetchError::Client(e) => ProbeError::Unexpected(e.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamFetcher {
    client: Client,
    timeout: Duration,
}

impl UpstreamFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().build().map_err(FetchError::Client)?;
        Ok(Self::with_client(client, timeout))
    }

    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET `url` with `headers`, reading the body to completion.
    pub async fn fetch(&self, url: &str, headers: HeaderMap) -> Result<FetchedPage, FetchError> {
        let started = Instant::now();
        let exchange = async {
            let response = self
                .client
                .get(url)
                .headers(headers)
                .send()
                .await
                .map_err(FetchError::Request)?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(FetchError::Body)?;
            Ok::<_, FetchError>(FetchedPage { status, body })
        };

        let result = match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                after_ms: self.timeout.as_millis() as u64,
            }),
        };

        tracing::debug!(
            url,
            elapsed_ms = started.elapsed().as_millis() as u64,
            status = result.as_ref().ok().map(|page| page.status),
            error = result.as_ref().err().map(|e| e.kind()),
            "Upstream fetch finished"
        );

        result
    }
}
