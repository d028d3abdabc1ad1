use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use whalecorp_poller::{ApiClientError, ChannelStatusSource};

/// In-memory status source with per-channel answers and latency.
///
/// Unscripted channels answer `{"live": false}` immediately.
#[derive(Debug, Default)]
pub struct FakeSource {
    answers: Mutex<HashMap<String, Option<Value>>>,
    latency: Mutex<HashMap<String, Duration>>,
    started: AtomicUsize,
    finished: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(&self, login: &str, body: Value) {
        self.answers
            .lock()
            .unwrap()
            .insert(login.to_string(), Some(body));
    }

    pub fn live(&self, login: &str) {
        self.answer(login, json!({"channel": login, "live": true}));
    }

    pub fn offline(&self, login: &str) {
        self.answer(login, json!({"channel": login, "live": false}));
    }

    /// Fail every request for `login`.
    pub fn fail(&self, login: &str) {
        self.answers.lock().unwrap().insert(login.to_string(), None);
    }

    pub fn delay(&self, login: &str, latency: Duration) {
        self.latency
            .lock()
            .unwrap()
            .insert(login.to_string(), latency);
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChannelStatusSource for FakeSource {
    async fn fetch_status(&self, login: &str) -> Result<Value, ApiClientError> {
        self.started.fetch_add(1, Ordering::SeqCst);

        let latency = self.latency.lock().unwrap().get(login).copied();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        self.finished.fetch_add(1, Ordering::SeqCst);
        let answer = self.answers.lock().unwrap().get(login).cloned();
        match answer {
            Some(Some(body)) => Ok(body),
            Some(None) => Err(ApiClientError::InvalidResponse(
                "HTTP 502: bad gateway".to_string(),
            )),
            None => Ok(json!({"live": false})),
        }
    }
}
