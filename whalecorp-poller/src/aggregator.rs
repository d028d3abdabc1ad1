//! Batch aggregation of per-channel statuses.
//!
//! One cycle queries every channel concurrently, waits for the whole batch,
//! and folds the answers into a [`LiveSnapshot`]. A failed channel counts as
//! not live; it never aborts the batch.

use futures_util::future::join_all;
use serde::Serialize;
use serde_json::Value;
use whalecorp_core::Clock;

use crate::api_client::{ApiClientError, ChannelStatusSource};
use crate::channels::{thumbnail_url, watch_url, THUMBNAIL_HEIGHT, THUMBNAIL_WIDTH};

/// A channel that is live in a snapshot, with what a card needs to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveChannel {
    pub channel: String,
    pub watch_url: String,
    pub thumbnail_url: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChannelState {
    Live,
    Offline,
    Failed { reason: String },
}

/// What happened to one requested channel during a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelReport {
    pub requested: String,
    #[serde(flatten)]
    pub state: ChannelState,
}

/// Result of one complete polling cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LiveSnapshot {
    pub live_channels: Vec<LiveChannel>,
    pub reports: Vec<ChannelReport>,
    pub taken_at_epoch_millis: i64,
}

impl LiveSnapshot {
    pub fn count(&self) -> usize {
        self.live_channels.len()
    }

    /// The live list is only shown when something is live.
    pub fn should_render(&self) -> bool {
        self.count() > 0
    }

    pub fn failed(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.state, ChannelState::Failed { .. }))
            .count()
    }
}

/// Live if any known backend shape says so.
pub fn is_json_live(body: &Value) -> bool {
    body.get("live") == Some(&Value::Bool(true))
        || body.get("isLive") == Some(&Value::Bool(true))
        || body
            .get("data")
            .filter(|data| data.is_object())
            .and_then(|data| data.get("type"))
            .and_then(Value::as_str)
            == Some("live")
        || body.get("status").and_then(Value::as_str) == Some("live")
}

/// Channel name reported by the backend, else `fallback`. Always lowercase.
pub fn pick_login(body: &Value, fallback: &str) -> String {
    let candidates = [
        body.get("channel"),
        body.get("login"),
        body.get("user"),
        body.get("username"),
        body.get("data").and_then(|data| data.get("user_login")),
    ];

    candidates
        .into_iter()
        .flatten()
        .find_map(|value| match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| fallback.to_string())
        .to_lowercase()
}

/// Fold one finished batch into a snapshot. `results[i]` answers `logins[i]`.
pub fn aggregate(
    logins: &[String],
    results: Vec<Result<Value, ApiClientError>>,
    taken_at_epoch_millis: i64,
) -> LiveSnapshot {
    let mut snapshot = LiveSnapshot {
        taken_at_epoch_millis,
        ..LiveSnapshot::default()
    };

    for (requested, result) in logins.iter().zip(results) {
        let state = match result {
            Ok(body) if is_json_live(&body) => {
                let channel = pick_login(&body, requested);
                snapshot.live_channels.push(LiveChannel {
                    watch_url: watch_url(&channel),
                    thumbnail_url: thumbnail_url(&channel, taken_at_epoch_millis),
                    width: THUMBNAIL_WIDTH,
                    height: THUMBNAIL_HEIGHT,
                    channel,
                });
                ChannelState::Live
            }
            Ok(_) => ChannelState::Offline,
            Err(err) => {
                tracing::debug!(channel = %requested, error = %err, "Channel status unavailable");
                ChannelState::Failed {
                    reason: err.to_string(),
                }
            }
        };
        snapshot.reports.push(ChannelReport {
            requested: requested.clone(),
            state,
        });
    }

    snapshot
}

/// Run one full cycle: query all channels concurrently and aggregate.
pub async fn poll_once(
    source: &dyn ChannelStatusSource,
    logins: &[String],
    clock: &dyn Clock,
) -> LiveSnapshot {
    let results = join_all(logins.iter().map(|login| source.fetch_status(login))).await;
    aggregate(logins, results, clock.now_millis())
}
