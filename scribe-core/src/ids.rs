//! Type-safe chat identifier
//!
//! Chat ids are UUIDs; they double as the object name of the transcript.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier of one chat
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(String);

impl ChatId {
    /// Create a new random ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Parse caller-supplied input, accepting only UUIDs.
    ///
    /// The id becomes part of an object path, so anything else is refused.
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        let uuid = Uuid::parse_str(s.trim())
            .map_err(|e| anyhow::anyhow!("Invalid chat id '{}': {}", s, e))?;
        Ok(Self(uuid.to_string()))
    }

    /// Create from an existing string (for ids recovered from object names)
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ChatId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ChatId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
