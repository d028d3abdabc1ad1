//! Channel page probe
//!
//! Fetches `<base>/<channel>` with a desktop-browser header set and runs the
//! detector over the body. Non-2xx statuses become a negative verdict tagged
//! `status:<code>`; the body of such a response is never inspected.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT_LANGUAGE, CACHE_CONTROL, PRAGMA, USER_AGENT,
};
use whalecorp_core::{detect, ChannelId, LivenessProbe, LivenessResult, ProbeError};

use crate::constants::{BROWSER_ACCEPT_LANGUAGE, BROWSER_USER_AGENT, NO_CACHE};
use crate::fetcher::UpstreamFetcher;
use crate::telemetry::METRICS;

#[derive(Debug, Clone)]
pub struct ChannelPageProbe {
    fetcher: UpstreamFetcher,
    base_url: String,
}

impl ChannelPageProbe {
    pub fn new(fetcher: UpstreamFetcher, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { fetcher, base_url }
    }

    /// Public page URL for `channel`, percent-encoded as a path segment.
    pub fn channel_url(&self, channel: &ChannelId) -> String {
        format!(
            "{}/{}",
            self.base_url,
            urlencoding::encode(channel.as_str())
        )
    }

    pub fn browser_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE),
        );
        headers.insert(CACHE_CONTROL, HeaderValue::from_static(NO_CACHE));
        headers.insert(PRAGMA, HeaderValue::from_static(NO_CACHE));
        headers
    }

    /// Fetch and classify one channel page.
    pub async fn scrape(&self, channel: &ChannelId) -> Result<LivenessResult, ProbeError> {
        let url = self.channel_url(channel);
        let started = Instant::now();
        let fetched = self.fetcher.fetch(&url, Self::browser_headers()).await;

        let outcome = match &fetched {
            Ok(page) if page.is_success() => "ok",
            Ok(_) => "status",
            Err(err) => err.kind(),
        };
        if let Ok(metrics) = METRICS.as_ref() {
            metrics.record_upstream_fetch(outcome, started.elapsed().as_secs_f64());
        }

        let page = fetched?;
        if !page.is_success() {
            tracing::debug!(channel = %channel, status = page.status, "Channel page not served");
            return Ok(LivenessResult::upstream_status(page.status));
        }

        Ok(detect(&page.body))
    }
}

#[async_trait]
impl LivenessProbe for ChannelPageProbe {
    async fn probe(&self, channel: &ChannelId) -> Result<LivenessResult, ProbeError> {
        self.scrape(channel).await
    }
}
