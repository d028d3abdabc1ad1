//! Liveness Cache
//!
//! Process-wide map from channel to the last known verdict. One entry per
//! canonical channel, overwritten in place on every refresh and never
//! evicted; the cache lives as long as the process.
//!
//! Writes are last-write-wins. Two concurrent misses for the same channel
//! may both refresh the entry.

use dashmap::DashMap;
use serde::Serialize;
use std::time::Duration;

use crate::channel::ChannelId;
use crate::liveness::LivenessResult;

/// Maximum age of a cached verdict before it must be refreshed.
pub const FRESHNESS_WINDOW: Duration = Duration::from_millis(20_000);

/// Last known verdict for one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheEntry {
    pub channel: ChannelId,
    pub live: bool,
    pub captured_at_epoch_millis: i64,
    pub reasons: Vec<String>,
}

impl CacheEntry {
    pub fn age_millis(&self, now_millis: i64) -> i64 {
        now_millis - self.captured_at_epoch_millis
    }

    /// Fresh iff strictly younger than the window.
    pub fn is_fresh(&self, now_millis: i64, window: Duration) -> bool {
        self.age_millis(now_millis) < window.as_millis() as i64
    }
}

/// Concurrent liveness cache keyed by canonical channel.
#[derive(Debug)]
pub struct LivenessCache {
    entries: DashMap<ChannelId, CacheEntry>,
    freshness_window: Duration,
}

impl Default for LivenessCache {
    fn default() -> Self {
        Self::new(FRESHNESS_WINDOW)
    }
}

impl LivenessCache {
    pub fn new(freshness_window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            freshness_window,
        }
    }

    pub fn freshness_window(&self) -> Duration {
        self.freshness_window
    }

    /// Current entry for `channel`, fresh or not.
    pub fn get(&self, channel: &ChannelId) -> Option<CacheEntry> {
        self.entries.get(channel).map(|entry| entry.value().clone())
    }

    /// Entry for `channel` only if it is still within the freshness window.
    pub fn get_fresh(&self, channel: &ChannelId, now_millis: i64) -> Option<CacheEntry> {
        self.get(channel)
            .filter(|entry| entry.is_fresh(now_millis, self.freshness_window))
    }

    /// Record `result` as the verdict for `channel` captured at `now_millis`,
    /// replacing any previous entry.
    pub fn put(&self, channel: ChannelId, result: &LivenessResult, now_millis: i64) {
        let entry = CacheEntry {
            channel: channel.clone(),
            live: result.live,
            captured_at_epoch_millis: now_millis,
            reasons: result.reasons.clone(),
        };
        self.entries.insert(channel, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
