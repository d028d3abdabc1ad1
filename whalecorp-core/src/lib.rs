//! WhaleCorp Core - Stream Liveness Domain
//!
//! Pure domain logic for the "live now" widget: channel identifiers, the HTML
//! liveness detector, the liveness cache, and the live-status policy that
//! sits between the HTTP layer and the upstream probe.
//!
//! This crate performs no network I/O. The upstream probe is injected through
//! [`LivenessProbe`] and time through [`Clock`].

pub mod cache;
pub mod channel;
pub mod clock;
pub mod detector;
pub mod error;
pub mod liveness;
pub mod probe;
pub mod status;

pub use cache::{CacheEntry, LivenessCache, FRESHNESS_WINDOW};
pub use channel::ChannelId;
pub use clock::{Clock, ManualClock, SystemClock};
pub use detector::{detect, detect_signals, LiveSignal, TYPED_LIVE_LOOKAHEAD};
pub use error::{CoreError, CoreResult, ProbeError};
pub use liveness::LivenessResult;
pub use probe::LivenessProbe;
pub use status::{LiveDebug, LiveStatus, LiveStatusOutcome, LiveStatusService, PROBE_FAILED};
