//! Channel page probe against an in-process upstream
//!
//! A small Axum app plays the streaming platform so the probe exercises real
//! HTTP: status handling, request headers, and the fetch deadline.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::Path,
    http::{header, HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use futures_util::stream::{self, StreamExt};
use proptest::prelude::*;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tower::ServiceExt;
use whalecorp_api::{create_api_router, ApiConfig, AppState, ChannelPageProbe, UpstreamFetcher};
use whalecorp_core::{LiveSignal, LiveStatusService, SystemClock, TYPED_LIVE_LOOKAHEAD};
use whalecorp_test_utils::assertions::{assert_live_with, assert_offline};
use whalecorp_test_utils::fixtures::{
    typed_live_with_gap, LIVE_BROADCAST_PAGE, OFFLINE_PAGE, PLAYER_STATE_PAGE, TYPED_LIVE_PAGE,
    TYPED_LIVE_WITHOUT_CONTEXT_PAGE,
};
use whalecorp_test_utils::generators::{arb_live_marker, arb_offline_noise};
use whalecorp_test_utils::{ChannelId, LivenessProbe, ProbeError};

// ============================================================================
// FAKE UPSTREAM
// ============================================================================

async fn channel_page(Path(channel): Path<String>, headers: HeaderMap) -> Response {
    match channel.as_str() {
        "livebroadcast" => (StatusCode::OK, LIVE_BROADCAST_PAGE).into_response(),
        "playerstate" => (StatusCode::OK, PLAYER_STATE_PAGE).into_response(),
        "typedlive" => (StatusCode::OK, TYPED_LIVE_PAGE).into_response(),
        "typedbare" => (StatusCode::OK, TYPED_LIVE_WITHOUT_CONTEXT_PAGE).into_response(),
        "typednear" => {
            let page = typed_live_with_gap(TYPED_LIVE_LOOKAHEAD, r#""game""#);
            (StatusCode::OK, page).into_response()
        }
        "typedfar" => {
            let page = typed_live_with_gap(TYPED_LIVE_LOOKAHEAD + 1, r#""game""#);
            (StatusCode::OK, page).into_response()
        }
        // Error pages can carry markers; they must never be inspected.
        "gone" => (StatusCode::NOT_FOUND, r#"{"isLive":true}"#).into_response(),
        "overloaded" => (StatusCode::SERVICE_UNAVAILABLE, "").into_response(),
        "browseronly" => {
            let is_browser = headers
                .get(header::USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|ua| ua.contains("Chrome/120"))
                && headers
                    .get(header::ACCEPT_LANGUAGE)
                    .is_some_and(|v| v == "en-US,en;q=0.9,es-ES;q=0.8")
                && headers
                    .get(header::CACHE_CONTROL)
                    .is_some_and(|v| v == "no-cache")
                && headers.get(header::PRAGMA).is_some_and(|v| v == "no-cache");
            let page = if is_browser { LIVE_BROADCAST_PAGE } else { OFFLINE_PAGE };
            (StatusCode::OK, page).into_response()
        }
        "slowheaders" => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            (StatusCode::OK, LIVE_BROADCAST_PAGE).into_response()
        }
        "slowbody" => {
            let head = stream::once(async { Ok::<_, Infallible>("<html><head>".to_string()) });
            let body = Body::from_stream(head.chain(stream::pending()));
            (StatusCode::OK, body).into_response()
        }
        _ => (StatusCode::OK, OFFLINE_PAGE).into_response(),
    }
}

async fn spawn_upstream() -> SocketAddr {
    let app = Router::new().route("/:channel", get(channel_page));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

fn probe_for(addr: SocketAddr, timeout: Duration) -> ChannelPageProbe {
    let fetcher = UpstreamFetcher::new(timeout).unwrap();
    ChannelPageProbe::new(fetcher, format!("http://{}", addr))
}

fn channel(name: &str) -> ChannelId {
    ChannelId::parse(name).unwrap()
}

// ============================================================================
// VERDICTS
// ============================================================================

#[tokio::test]
async fn live_pages_are_detected() {
    let addr = spawn_upstream().await;
    let probe = probe_for(addr, Duration::from_secs(2));

    let result = probe.probe(&channel("livebroadcast")).await.unwrap();
    assert_live_with(&result, &[LiveSignal::LiveBroadcastFlag]);

    let result = probe.probe(&channel("playerstate")).await.unwrap();
    assert_live_with(&result, &[LiveSignal::PlayerState]);

    let result = probe.probe(&channel("typedlive")).await.unwrap();
    assert_live_with(&result, &[LiveSignal::TypedLiveBlob]);
}

#[tokio::test]
async fn offline_page_is_not_live() {
    let addr = spawn_upstream().await;
    let probe = probe_for(addr, Duration::from_secs(2));

    let result = probe.probe(&channel("faaaxy")).await.unwrap();
    assert_offline(&result);
    assert!(result.reasons.is_empty());
}

#[tokio::test]
async fn error_status_short_circuits_detection() {
    let addr = spawn_upstream().await;
    let probe = probe_for(addr, Duration::from_secs(2));

    let result = probe.probe(&channel("gone")).await.unwrap();
    assert!(!result.live);
    assert_eq!(result.reasons, vec!["status:404".to_string()]);

    let result = probe.probe(&channel("overloaded")).await.unwrap();
    assert_eq!(result.reasons, vec!["status:503".to_string()]);
}

#[tokio::test]
async fn browser_headers_are_sent() {
    let addr = spawn_upstream().await;
    let probe = probe_for(addr, Duration::from_secs(2));

    let result = probe.probe(&channel("browseronly")).await.unwrap();
    assert!(result.live, "upstream did not see browser headers: {:?}", result);
}

#[tokio::test]
async fn typed_live_needs_context_within_lookahead() {
    let addr = spawn_upstream().await;
    let probe = probe_for(addr, Duration::from_secs(2));

    let result = probe.probe(&channel("typednear")).await.unwrap();
    assert_live_with(&result, &[LiveSignal::TypedLiveBlob]);

    let result = probe.probe(&channel("typedfar")).await.unwrap();
    assert_offline(&result);

    let result = probe.probe(&channel("typedbare")).await.unwrap();
    assert_offline(&result);
}

/// Serves `page` at every path.
async fn spawn_page(page: String) -> SocketAddr {
    let app = Router::new().fallback(move || {
        let page = page.clone();
        async move { page }
    });
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

fn test_runtime() -> Result<tokio::runtime::Runtime, TestCaseError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| TestCaseError::fail(format!("Failed to build runtime: {}", e)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// A marker anywhere in served markup makes the channel live.
    #[test]
    fn prop_served_marker_is_detected(
        prefix in arb_offline_noise(),
        marker in arb_live_marker(),
        suffix in arb_offline_noise(),
    ) {
        let rt = test_runtime()?;
        rt.block_on(async {
            let addr = spawn_page(format!("{}{}{}", prefix, marker, suffix)).await;
            let result = probe_for(addr, Duration::from_secs(2))
                .probe(&channel("anyone"))
                .await;
            prop_assert!(result.is_ok_and(|r| r.live));
            Ok(())
        })?;
    }

    /// Marker-free markup is never live.
    #[test]
    fn prop_served_noise_is_offline(page in arb_offline_noise()) {
        let rt = test_runtime()?;
        rt.block_on(async {
            let addr = spawn_page(page).await;
            let result = probe_for(addr, Duration::from_secs(2))
                .probe(&channel("anyone"))
                .await;
            prop_assert!(result.is_ok_and(|r| !r.live && r.reasons.is_empty()));
            Ok(())
        })?;
    }
}

// ============================================================================
// FAILURES
// ============================================================================

#[tokio::test]
async fn stalled_headers_hit_the_deadline() {
    let addr = spawn_upstream().await;
    let probe = probe_for(addr, Duration::from_millis(200));

    let started = Instant::now();
    let err = probe.probe(&channel("slowheaders")).await.unwrap_err();

    assert_eq!(err, ProbeError::Timeout { after_ms: 200 });
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn stalled_body_hits_the_deadline() {
    let addr = spawn_upstream().await;
    let probe = probe_for(addr, Duration::from_millis(200));

    let started = Instant::now();
    let err = probe.probe(&channel("slowbody")).await.unwrap_err();

    assert_eq!(err, ProbeError::Timeout { after_ms: 200 });
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn timed_out_request_is_aborted() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // Accept, never answer, and report whether the client hung up.
    let watcher = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 8192];
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(_) => continue,
                }
            }
        })
        .await
        .is_ok()
    });

    let probe = probe_for(addr, Duration::from_millis(200));
    let err = probe.probe(&channel("silent")).await.unwrap_err();
    assert_eq!(err.kind(), "timeout");

    assert!(watcher.await.unwrap(), "connection left open after timeout");
}

#[tokio::test]
async fn refused_connection_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let probe = probe_for(addr, Duration::from_secs(2));
    let err = probe.probe(&channel("faaaxy")).await.unwrap_err();
    assert!(matches!(err, ProbeError::Network(_)), "got {:?}", err);
}

// ============================================================================
// END TO END
// ============================================================================

#[tokio::test]
async fn live_status_endpoint_over_real_probe() {
    let addr = spawn_upstream().await;
    let probe = probe_for(addr, Duration::from_millis(200));
    let service = LiveStatusService::new(Arc::new(probe), Arc::new(SystemClock));
    let app = create_api_router(AppState::new(Arc::new(service)), &ApiConfig::default());

    let call = |uri: &'static str| {
        let app = app.clone();
        async move {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let response = app.oneshot(request).await.unwrap();
            let body = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            serde_json::from_slice::<serde_json::Value>(&body).unwrap()
        }
    };

    let live = call("/api/stream/live-status?channel=LiveBroadcast").await;
    assert_eq!(
        live,
        serde_json::json!({"channel": "livebroadcast", "live": true})
    );

    let failed = call("/api/stream/live-status?channel=slowheaders").await;
    assert_eq!(
        failed,
        serde_json::json!({"channel": "slowheaders", "live": false, "error": "probe_failed"})
    );

    let debug = call("/api/stream/live-debug?channel=gone").await;
    assert_eq!(
        debug,
        serde_json::json!({"channel": "gone", "live": false, "reasons": ["status:404"]})
    );
}
