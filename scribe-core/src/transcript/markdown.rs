//! Markdown transcripts
//!
//! ```text
//! # Chat ID: <id>
//! # Created: <timestamp>
//!
//!
//! ### USER
//! <message text>
//!
//! ### MODEL
//! <message text>
//! ```
//!
//! Content is not escaped. A message that itself contains `### USER` or
//! `### MODEL` is split at that point when decoded.

use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

use super::{Message, Role, TranscriptCodec, format_timestamp};
use crate::ids::ChatId;

/// A section marker must be followed by whitespace before the content starts.
static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"### (USER|MODEL)\s+").expect("valid marker regex"));

/// Content ends at the next marker text wherever it appears.
static BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"### (?:USER|MODEL)").expect("valid boundary regex"));

pub fn encode_header(id: &ChatId, created: DateTime<Utc>) -> String {
    format!(
        "# Chat ID: {}\n# Created: {}\n\n",
        id,
        format_timestamp(created)
    )
}

pub fn encode_turn(role: Role, content: &str) -> String {
    format!("\n\n### {}\n{}", role.marker(), content)
}

pub fn decode_transcript(document: &str) -> Vec<Message> {
    let mut messages = Vec::new();
    let mut pos = 0;

    while let Some(marker) = MARKER.captures_at(document, pos) {
        let (Some(whole), Some(role)) = (marker.get(0), marker.get(1)) else {
            break;
        };
        let role = if role.as_str() == "USER" {
            Role::User
        } else {
            Role::Model
        };

        let start = whole.end();
        let end = BOUNDARY
            .find_at(document, start)
            .map(|m| m.start())
            .unwrap_or(document.len());

        messages.push(Message::new(role, document[start..end].trim()));
        pos = end;
    }

    messages
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MarkdownCodec;

impl TranscriptCodec for MarkdownCodec {
    fn extension(&self) -> &'static str {
        "md"
    }

    fn content_type(&self) -> &'static str {
        "text/markdown"
    }

    fn encode_header(&self, id: &ChatId, created: DateTime<Utc>) -> String {
        encode_header(id, created)
    }

    fn encode_turn(&self, role: Role, content: &str, _at: DateTime<Utc>) -> String {
        encode_turn(role, content)
    }

    fn decode(&self, document: &str) -> Vec<Message> {
        decode_transcript(document)
    }
}
