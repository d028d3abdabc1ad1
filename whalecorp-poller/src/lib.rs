//! WhaleCorp poller library exports.

pub mod aggregator;
pub mod api_client;
pub mod channels;
pub mod config;
pub mod error;
pub mod poller;

pub use aggregator::{ChannelReport, ChannelState, LiveChannel, LiveSnapshot};
pub use api_client::{ApiClientError, ChannelStatusSource, ProbeClient};
pub use config::{ConfigError, PollerConfig};
pub use error::PollerError;
pub use poller::{Poller, PollerHandle};
