//! Transcript encoding
//!
//! A transcript is one text document per chat: a header written at creation
//! followed by turns appended by blind concatenation.

mod jsonl;
mod markdown;

pub use jsonl::JsonlCodec;
pub use markdown::{MarkdownCodec, decode_transcript, encode_header, encode_turn};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ids::ChatId;

/// Maximum characters of the first user message shown in a chat listing
pub const PREVIEW_CHARS: usize = 30;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// Uppercase name used in markdown section markers
    pub fn marker(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Model => "MODEL",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Model => write!(f, "model"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "model" => Ok(Role::Model),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// One decoded turn
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self::new(Role::Model, content)
    }
}

/// A document format for chat transcripts.
///
/// Every encoding is append-only: `decode(doc + encode_turn(..))` must yield
/// `decode(doc)` plus the new turn.
pub trait TranscriptCodec: Send + Sync {
    /// Object name suffix, without the dot
    fn extension(&self) -> &'static str;

    /// MIME type sent to the object store on upload
    fn content_type(&self) -> &'static str;

    fn encode_header(&self, id: &ChatId, created: DateTime<Utc>) -> String;

    fn encode_turn(&self, role: Role, content: &str, at: DateTime<Utc>) -> String;

    /// Decode all turns; never fails, unparseable input yields fewer turns.
    fn decode(&self, document: &str) -> Vec<Message>;

    /// Short label for chat listings taken from the first user turn
    fn preview(&self, document: &str) -> Option<String> {
        self.decode(document)
            .into_iter()
            .find(|m| m.role == Role::User)
            .map(|m| truncate_preview(&m.content))
    }
}

/// Timestamps in headers use millisecond-precision UTC, e.g. `2025-01-02T03:04:05.678Z`
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Collapse newlines and cut to [`PREVIEW_CHARS`], marking the cut with `...`
pub fn truncate_preview(content: &str) -> String {
    let clean = content.trim().replace('\n', " ");
    if clean.chars().count() > PREVIEW_CHARS {
        let cut: String = clean.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        clean
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncation() {
        assert_eq!(truncate_preview("  short  "), "short");
        assert_eq!(truncate_preview("line one\nline two"), "line one line two");

        let long = "a".repeat(31);
        assert_eq!(truncate_preview(&long), format!("{}...", "a".repeat(30)));
        assert_eq!(truncate_preview(&"b".repeat(30)), "b".repeat(30));
    }

    #[test]
    fn test_preview_counts_characters_not_bytes() {
        let cyrillic = "Ж".repeat(40);
        assert_eq!(truncate_preview(&cyrillic), format!("{}...", "Ж".repeat(30)));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("USER".parse::<Role>().unwrap(), Role::User);
        assert_eq!("model".parse::<Role>().unwrap(), Role::Model);
        assert!("assistant".parse::<Role>().is_err());
        assert_eq!(Role::Model.marker(), "MODEL");
        assert_eq!(Role::User.to_string(), "user");
    }

    #[test]
    fn test_timestamp_format() {
        let at = DateTime::parse_from_rfc3339("2025-01-02T03:04:05.678+00:00")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_timestamp(at), "2025-01-02T03:04:05.678Z");
    }
}
