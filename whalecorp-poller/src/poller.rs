//! Background polling task.
//!
//! The task polls on a fixed interval while the surface is visible, and
//! right away whenever it goes from hidden to visible. Each cycle is one
//! complete batch; the snapshot is published only once the batch is done.
//! Shutdown drops any batch still in flight, which cancels its requests.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use whalecorp_core::Clock;

use crate::aggregator::{poll_once, LiveSnapshot};
use crate::api_client::{ChannelStatusSource, ProbeClient};
use crate::config::PollerConfig;
use crate::error::PollerError;

pub struct Poller {
    source: Arc<dyn ChannelStatusSource>,
    channels: Vec<String>,
    interval: Duration,
    clock: Arc<dyn Clock>,
}

impl Poller {
    /// `channels` must already be normalized logins.
    pub fn new(
        source: Arc<dyn ChannelStatusSource>,
        channels: Vec<String>,
        interval: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            channels,
            interval,
            clock,
        }
    }

    /// Validate `config` and poll the live-status endpoint it names.
    pub fn from_config(config: &PollerConfig, clock: Arc<dyn Clock>) -> Result<Self, PollerError> {
        config.validate()?;
        let client = ProbeClient::new(config, clock.clone())?;
        Ok(Self::new(
            Arc::new(client),
            config.channel_logins(),
            config.poll_interval(),
            clock,
        ))
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn spawn(self, initially_visible: bool) -> PollerHandle {
        let (visible_tx, visible_rx) = watch::channel(initially_visible);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (snapshot_tx, snapshot_rx) = watch::channel(None);

        let task = tokio::spawn(self.run(visible_rx, shutdown_rx, snapshot_tx));

        PollerHandle {
            visible: visible_tx,
            shutdown: shutdown_tx,
            snapshots: snapshot_rx,
            task,
        }
    }

    async fn run(
        self,
        mut visible: watch::Receiver<bool>,
        mut shutdown: watch::Receiver<bool>,
        snapshots: watch::Sender<Option<LiveSnapshot>>,
    ) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let poll_now = tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                changed = visible.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let now_visible = *visible.borrow_and_update();
                    if now_visible {
                        ticker.reset();
                    }
                    now_visible
                }
                _ = ticker.tick() => *visible.borrow(),
            };

            if !poll_now {
                continue;
            }

            tokio::select! {
                biased;
                _ = shutdown.changed() => {
                    tracing::debug!("Poll cycle cancelled by shutdown");
                    break;
                }
                snapshot = poll_once(self.source.as_ref(), &self.channels, self.clock.as_ref()) => {
                    tracing::info!(
                        live = snapshot.count(),
                        failed = snapshot.failed(),
                        polled = self.channels.len(),
                        "Poll cycle complete"
                    );
                    snapshots.send_replace(Some(snapshot));
                }
            }
        }

        tracing::debug!("Poller stopped");
    }
}

/// Control surface for a spawned [`Poller`].
///
/// Dropping the handle stops the task at its next suspension point.
pub struct PollerHandle {
    visible: watch::Sender<bool>,
    shutdown: watch::Sender<bool>,
    snapshots: watch::Receiver<Option<LiveSnapshot>>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Report surface visibility. Only a change has any effect.
    pub fn set_visible(&self, visible: bool) {
        self.visible.send_if_modified(|current| {
            if *current == visible {
                false
            } else {
                *current = visible;
                true
            }
        });
    }

    pub fn is_visible(&self) -> bool {
        *self.visible.borrow()
    }

    /// Receiver that wakes after every completed cycle.
    pub fn snapshots(&self) -> watch::Receiver<Option<LiveSnapshot>> {
        self.snapshots.clone()
    }

    pub fn latest(&self) -> Option<LiveSnapshot> {
        self.snapshots.borrow().clone()
    }

    /// Stop polling, cancel any in-flight batch, and wait for the task.
    pub async fn shutdown(self) -> Result<(), PollerError> {
        self.shutdown.send_replace(true);
        self.task.await?;
        Ok(())
    }
}
