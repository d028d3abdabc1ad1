//! Channel identifiers
//!
//! A channel is named by its platform login handle. Handles are compared
//! case- and whitespace-insensitively, so every lookup goes through
//! [`ChannelId::parse`], which trims and lowercases the raw input.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};

/// Canonical (trimmed, lowercase) channel identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(try_from = "String", into = "String")]
pub struct ChannelId(String);

impl ChannelId {
    /// Canonicalize a raw channel handle.
    ///
    /// Fails with [`CoreError::EmptyChannel`] when nothing is left after
    /// trimming.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let canonical = raw.trim().to_lowercase();
        if canonical.is_empty() {
            return Err(CoreError::EmptyChannel);
        }
        Ok(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ChannelId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ChannelId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ChannelId> for String {
    fn from(value: ChannelId) -> Self {
        value.0
    }
}
