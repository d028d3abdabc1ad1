//! Batch aggregation tests against an in-memory status source.

mod support;

use std::time::Duration;

use proptest::prelude::*;
use serde_json::json;
use support::source::FakeSource;
use tokio::time::Instant;
use whalecorp_core::ManualClock;
use whalecorp_poller::aggregator::{is_json_live, pick_login, poll_once};
use whalecorp_poller::ChannelState;

const T: i64 = 1_700_000_000_000;

fn logins(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn one_live_one_offline_one_failed_counts_one() {
    let source = FakeSource::new();
    source.live("a");
    source.offline("b");
    source.fail("c");
    let clock = ManualClock::new(T);

    let snapshot = poll_once(&source, &logins(&["a", "b", "c"]), &clock).await;

    assert_eq!(snapshot.count(), 1);
    assert_eq!(snapshot.live_channels[0].channel, "a");
    assert_eq!(
        snapshot.live_channels[0].thumbnail_url,
        format!(
            "https://static-cdn.jtvnw.net/previews-ttv/live_user_a-320x180.jpg?cb={}",
            T
        )
    );
    let states: Vec<_> = snapshot.reports.iter().map(|r| r.state.clone()).collect();
    assert_eq!(states[0], ChannelState::Live);
    assert_eq!(states[1], ChannelState::Offline);
    assert!(matches!(states[2], ChannelState::Failed { .. }));
    assert_eq!(snapshot.taken_at_epoch_millis, T);
}

#[tokio::test]
async fn empty_channel_list_counts_zero() {
    let source = FakeSource::new();
    let snapshot = poll_once(&source, &[], &ManualClock::new(T)).await;

    assert_eq!(snapshot.count(), 0);
    assert!(!snapshot.should_render());
    assert_eq!(source.started(), 0);
}

#[tokio::test(start_paused = true)]
async fn batch_requests_run_concurrently() {
    let source = FakeSource::new();
    for name in ["a", "b", "c"] {
        source.delay(name, Duration::from_secs(2));
    }
    source.live("b");

    let start = Instant::now();
    let snapshot = poll_once(&source, &logins(&["a", "b", "c"]), &ManualClock::new(T)).await;

    assert_eq!(start.elapsed(), Duration::from_secs(2));
    assert_eq!(snapshot.count(), 1);
    assert_eq!(source.finished(), 3);
}

#[tokio::test(start_paused = true)]
async fn batch_waits_for_slowest_channel() {
    let source = FakeSource::new();
    source.live("fast");
    source.live("slow");
    source.delay("slow", Duration::from_secs(5));

    let start = Instant::now();
    let snapshot = poll_once(&source, &logins(&["fast", "slow"]), &ManualClock::new(T)).await;

    assert_eq!(start.elapsed(), Duration::from_secs(5));
    assert_eq!(snapshot.count(), 2);
}

#[tokio::test]
async fn reported_channel_name_wins_over_requested() {
    let source = FakeSource::new();
    source.answer("trick", json!({"isLive": true, "data": {"user_login": "TrickMasteh"}}));

    let snapshot = poll_once(&source, &logins(&["trick"]), &ManualClock::new(T)).await;

    assert_eq!(snapshot.live_channels[0].channel, "trickmasteh");
    assert_eq!(snapshot.reports[0].requested, "trick");
}

#[tokio::test]
async fn probe_failed_body_is_not_live() {
    let source = FakeSource::new();
    source.answer("a", json!({"channel": "a", "live": false, "error": "probe_failed"}));

    let snapshot = poll_once(&source, &logins(&["a"]), &ManualClock::new(T)).await;

    assert_eq!(snapshot.count(), 0);
    assert_eq!(snapshot.reports[0].state, ChannelState::Offline);
}

proptest! {
    #[test]
    fn non_true_live_flags_are_not_live(flag in prop_oneof![
        Just(json!(false)),
        Just(json!("true")),
        Just(json!(1)),
        Just(json!(null)),
    ]) {
        let body = json!({"live": flag.clone(), "isLive": flag});
        prop_assert!(!is_json_live(&body));
    }

    #[test]
    fn picked_login_is_lowercase(name in "[A-Za-z0-9_]{1,25}") {
        let picked = pick_login(&json!({"login": name.clone()}), "fallback");
        prop_assert_eq!(picked, name.to_lowercase());
    }
}
