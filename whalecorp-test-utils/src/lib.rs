//! WhaleCorp Test Utilities
//!
//! Centralized test infrastructure for the WhaleCorp workspace:
//! - A scripted liveness probe for exercising the status policy
//! - Proptest generators for channels and channel-page markup
//! - HTML fixtures for each detection signal
//! - Custom assertions for liveness verdicts

pub use whalecorp_core::{
    ChannelId, Clock, LiveSignal, LivenessProbe, LivenessResult, ManualClock, ProbeError,
};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// MOCK PROBE
// ============================================================================

/// Scripted probe: per-channel results, call counting, optional latency.
///
/// Channels without a script report "not live" with no reasons.
#[derive(Debug, Default)]
pub struct ScriptedProbe {
    scripts: Mutex<HashMap<ChannelId, Result<LivenessResult, ProbeError>>>,
    calls: Mutex<HashMap<ChannelId, usize>>,
    total_calls: AtomicUsize,
    latency: Option<Duration>,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every probe by `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Answer `channel` with `result` until re-scripted.
    pub fn script(&self, channel: &str, result: Result<LivenessResult, ProbeError>) {
        let channel = ChannelId::parse(channel).expect("scripted channel must not be blank");
        self.scripts
            .lock()
            .expect("script lock poisoned")
            .insert(channel, result);
    }

    pub fn script_live(&self, channel: &str) {
        self.script(channel, Ok(fixtures::live_result()));
    }

    pub fn script_offline(&self, channel: &str) {
        self.script(channel, Ok(LivenessResult::from_signals(&[])));
    }

    pub fn script_error(&self, channel: &str, error: ProbeError) {
        self.script(channel, Err(error));
    }

    /// Number of probes issued for `channel`.
    pub fn calls_for(&self, channel: &str) -> usize {
        let Ok(channel) = ChannelId::parse(channel) else {
            return 0;
        };
        self.calls
            .lock()
            .expect("call lock poisoned")
            .get(&channel)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LivenessProbe for ScriptedProbe {
    async fn probe(&self, channel: &ChannelId) -> Result<LivenessResult, ProbeError> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        *self
            .calls
            .lock()
            .expect("call lock poisoned")
            .entry(channel.clone())
            .or_insert(0) += 1;

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        self.scripts
            .lock()
            .expect("script lock poisoned")
            .get(channel)
            .cloned()
            .unwrap_or_else(|| Ok(LivenessResult::from_signals(&[])))
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for channels and channel-page markup.

    use super::*;
    use proptest::prelude::*;

    /// Raw channel handles with random case and surrounding whitespace.
    pub fn arb_raw_channel() -> impl Strategy<Value = String> {
        ("[ \t]{0,3}", "[A-Za-z0-9_]{1,25}", "[ \t\n]{0,3}")
            .prop_map(|(lead, name, trail)| format!("{}{}{}", lead, name, trail))
    }

    pub fn arb_channel_id() -> impl Strategy<Value = ChannelId> {
        "[a-z0-9_]{1,25}".prop_map(|name| {
            ChannelId::parse(&name).expect("generated channel names are never blank")
        })
    }

    /// Markup-ish noise that cannot contain any live marker.
    pub fn arb_offline_noise() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 <>/=.,:{}\\[\\]-]{0,400}"
    }

    /// A single standalone live marker (signals 1 to 3).
    pub fn arb_live_marker() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(r#""isLiveBroadcast":true"#.to_string()),
            Just(r#""isLive" : true"#.to_string()),
            Just(r#"data-a-player-state="site.live""#.to_string()),
            Just("data-a-player-state='site.live'".to_string()),
        ]
    }

    pub fn arb_live_signal() -> impl Strategy<Value = LiveSignal> {
        prop_oneof![
            Just(LiveSignal::LiveBroadcastFlag),
            Just(LiveSignal::LiveFlag),
            Just(LiveSignal::PlayerState),
            Just(LiveSignal::TypedLiveBlob),
        ]
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built channel pages and verdicts.

    use super::*;

    pub const OFFLINE_PAGE: &str = r#"<!doctype html><html><head><title>faaaxy - Twitch</title>
<script type="application/ld+json">{"@type":"VideoObject","isLiveBroadcast":false}</script>
</head><body><div data-a-player-state="site.offline"></div></body></html>"#;

    pub const LIVE_BROADCAST_PAGE: &str = r#"<!doctype html><html><head>
<script type="application/ld+json">[{"@context":"http://schema.org","@type":"VideoObject","publication":{"@type":"BroadcastEvent","isLiveBroadcast":true}}]</script>
</head><body></body></html>"#;

    pub const PLAYER_STATE_PAGE: &str =
        "<html><body><div class='player' data-a-player-state='site.live'></div></body></html>";

    pub const TYPED_LIVE_PAGE: &str = r#"<html><script>window.__STATE__={"stream":{"type":"live","viewer_count":1337,"game":"Lost Ark"}}</script></html>"#;

    pub const TYPED_LIVE_WITHOUT_CONTEXT_PAGE: &str =
        r#"<html><script>{"filter":{"type":"live"},"title":"Past broadcasts"}</script></html>"#;

    /// A positive verdict as produced by the `"isLive": true` signal.
    pub fn live_result() -> LivenessResult {
        LivenessResult::from_signals(&[LiveSignal::LiveFlag])
    }

    /// `"type":"live"` followed by `gap` filler characters and then `token`.
    pub fn typed_live_with_gap(gap: usize, token: &str) -> String {
        format!(r#"{{"type":"live"{}{}:1}}"#, "x".repeat(gap), token)
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Custom assertions for liveness verdicts.

    use super::*;

    /// Assert the verdict is live and reports exactly `signals`, in order.
    #[track_caller]
    pub fn assert_live_with(result: &LivenessResult, signals: &[LiveSignal]) {
        assert!(result.live, "Expected live verdict, got: {:?}", result);
        let expected: Vec<String> = signals.iter().map(|s| s.reason().to_string()).collect();
        assert_eq!(result.reasons, expected);
    }

    /// Assert the verdict is not live and has no detector reasons.
    #[track_caller]
    pub fn assert_offline(result: &LivenessResult) {
        assert!(!result.live, "Expected offline verdict, got: {:?}", result);
        assert!(
            result.reasons.iter().all(|r| !r.starts_with("match:")),
            "Offline verdict carries match reasons: {:?}",
            result.reasons
        );
    }
}
