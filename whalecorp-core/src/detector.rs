//! HTML Liveness Detector
//!
//! Channel pages are untrusted, unversioned markup. Any one marker can be
//! missing depending on the template variant served, so several independent
//! signals are checked and the page counts as live if any of them fires.
//!
//! The loose `"type":"live"` token appears in unrelated blobs too, so that
//! signal only fires when a viewer count, game or start timestamp follows
//! within [`TYPED_LIVE_LOOKAHEAD`] characters.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::liveness::LivenessResult;

/// Maximum characters allowed between `"type":"live"` and its corroborating
/// context token.
pub const TYPED_LIVE_LOOKAHEAD: usize = 180;

static LIVE_BROADCAST_FLAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)"isLiveBroadcast"\s*:\s*true"#).expect("Invalid isLiveBroadcast regex")
});

static LIVE_FLAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)"isLive"\s*:\s*true"#).expect("Invalid isLive regex"));

static PLAYER_STATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)data-a-player-state\s*=\s*(?:"site\.live"|'site\.live')"#)
        .expect("Invalid player state regex")
});

static TYPED_LIVE_BLOB: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r#"(?is)"type"\s*:\s*"live".{{0,{}}}(?:"viewer_count"|"game"|"started_at")"#,
        TYPED_LIVE_LOOKAHEAD
    );
    Regex::new(&pattern).expect("Invalid typed live regex")
});

/// One independent liveness marker, in check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiveSignal {
    /// `"isLiveBroadcast": true`
    LiveBroadcastFlag,
    /// `"isLive": true`
    LiveFlag,
    /// `data-a-player-state="site.live"` (either quote style)
    PlayerState,
    /// `"type":"live"` with nearby viewer/game/start context
    TypedLiveBlob,
}

impl LiveSignal {
    /// All signals in the order they are checked.
    pub const ALL: [LiveSignal; 4] = [
        LiveSignal::LiveBroadcastFlag,
        LiveSignal::LiveFlag,
        LiveSignal::PlayerState,
        LiveSignal::TypedLiveBlob,
    ];

    /// Stable reason tag reported on the diagnostic path.
    pub fn reason(&self) -> &'static str {
        match self {
            LiveSignal::LiveBroadcastFlag => r#"match:"isLiveBroadcast":true"#,
            LiveSignal::LiveFlag => r#"match:"isLive":true"#,
            LiveSignal::PlayerState => "match:data-a-player-state=site.live",
            LiveSignal::TypedLiveBlob => r#"match:blob contains "type":"live"+context"#,
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            LiveSignal::LiveBroadcastFlag => &LIVE_BROADCAST_FLAG,
            LiveSignal::LiveFlag => &LIVE_FLAG,
            LiveSignal::PlayerState => &PLAYER_STATE,
            LiveSignal::TypedLiveBlob => &TYPED_LIVE_BLOB,
        }
    }

    /// Whether this signal fires anywhere in `html`.
    pub fn matches(&self, html: &str) -> bool {
        self.pattern().is_match(html)
    }
}

/// Every signal that fires for `html`, in check order.
pub fn detect_signals(html: &str) -> Vec<LiveSignal> {
    LiveSignal::ALL
        .iter()
        .copied()
        .filter(|signal| signal.matches(html))
        .collect()
}

/// Decide whether a channel page indicates a live broadcast.
pub fn detect(html: &str) -> LivenessResult {
    LivenessResult::from_signals(&detect_signals(html))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_not_live() {
        let result = detect("");
        assert!(!result.live);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn test_live_broadcast_flag() {
        let html = r#"<script>{"@type":"VideoObject","isLiveBroadcast" : true}</script>"#;
        assert_eq!(detect_signals(html), vec![LiveSignal::LiveBroadcastFlag]);
    }

    #[test]
    fn test_live_flag_is_case_insensitive() {
        let html = r#"{"ISLIVE":TRUE}"#;
        assert_eq!(detect_signals(html), vec![LiveSignal::LiveFlag]);
    }

    #[test]
    fn test_live_flag_false_does_not_fire() {
        let html = r#"{"isLive":false,"isLiveBroadcast":false}"#;
        assert!(detect_signals(html).is_empty());
    }

    #[test]
    fn test_player_state_double_quotes() {
        let html = r#"<div data-a-player-state="site.live"></div>"#;
        assert_eq!(detect_signals(html), vec![LiveSignal::PlayerState]);
    }

    #[test]
    fn test_player_state_single_quotes() {
        let html = "<div data-a-player-state = 'site.live'></div>";
        let result = detect(html);
        assert!(result.live);
        assert_eq!(result.reasons, vec![LiveSignal::PlayerState.reason().to_string()]);
    }

    #[test]
    fn test_player_state_mixed_quotes_do_not_fire() {
        let html = r#"<div data-a-player-state="site.live'></div>"#;
        assert!(detect_signals(html).is_empty());
    }

    #[test]
    fn test_offline_player_state_does_not_fire() {
        let html = r#"<div data-a-player-state="site.offline"></div>"#;
        assert!(!detect(html).live);
    }

    #[test]
    fn test_typed_live_without_context_is_not_live() {
        let html = r#"{"type":"live","title":"rerun"}"#;
        assert!(!detect(html).live);
    }

    #[test]
    fn test_typed_live_with_context_in_range() {
        let html = r#"{"type":"live","id":"1","viewer_count":42}"#;
        assert_eq!(detect_signals(html), vec![LiveSignal::TypedLiveBlob]);
    }

    #[test]
    fn test_typed_live_context_spans_newlines() {
        let html = "{\"type\": \"live\",\n  \"started_at\": \"2024-01-01T00:00:00Z\"}";
        assert_eq!(detect_signals(html), vec![LiveSignal::TypedLiveBlob]);
    }

    #[test]
    fn test_typed_live_lookahead_boundary() {
        let at_limit = format!(
            r#""type":"live"{}"game""#,
            "x".repeat(TYPED_LIVE_LOOKAHEAD)
        );
        assert!(detect(&at_limit).live);

        let past_limit = format!(
            r#""type":"live"{}"game""#,
            "x".repeat(TYPED_LIVE_LOOKAHEAD + 1)
        );
        assert!(!detect(&past_limit).live);
    }

    #[test]
    fn test_all_signals_reported_in_order() {
        let html = concat!(
            r#"{"type":"live","viewer_count":10}"#,
            r#"<div data-a-player-state='site.live'></div>"#,
            r#"{"isLive":true}"#,
            r#"{"isLiveBroadcast":true}"#,
        );
        let result = detect(html);
        assert!(result.live);
        let expected: Vec<String> = LiveSignal::ALL.iter().map(|s| s.reason().to_string()).collect();
        assert_eq!(result.reasons, expected);
    }

    #[test]
    fn test_reason_tags_are_unique() {
        for (i, a) in LiveSignal::ALL.iter().enumerate() {
            for b in LiveSignal::ALL.iter().skip(i + 1) {
                assert_ne!(a.reason(), b.reason());
            }
        }
    }
}
