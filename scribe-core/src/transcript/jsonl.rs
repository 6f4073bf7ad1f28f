//! JSON Lines transcripts
//!
//! One header record followed by one record per turn:
//!
//! ```text
//! {"chat_id":"<id>","created":"<timestamp>"}
//! {"role":"user","content":"hi","timestamp":"<timestamp>"}
//! ```
//!
//! Content is carried verbatim, so there is no marker ambiguity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Message, Role, TranscriptCodec, format_timestamp};
use crate::ids::ChatId;

#[derive(Serialize)]
struct HeaderRecord<'a> {
    chat_id: &'a str,
    created: String,
}

#[derive(Serialize, Deserialize)]
struct TurnRecord {
    role: Role,
    content: String,
    #[serde(default)]
    timestamp: Option<String>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct JsonlCodec;

impl TranscriptCodec for JsonlCodec {
    fn extension(&self) -> &'static str {
        "jsonl"
    }

    fn content_type(&self) -> &'static str {
        "application/x-ndjson"
    }

    fn encode_header(&self, id: &ChatId, created: DateTime<Utc>) -> String {
        let record = HeaderRecord {
            chat_id: id.as_str(),
            created: format_timestamp(created),
        };
        // Serializing a struct of strings cannot fail.
        format!("{}\n", serde_json::to_string(&record).unwrap_or_default())
    }

    fn encode_turn(&self, role: Role, content: &str, at: DateTime<Utc>) -> String {
        let record = TurnRecord {
            role,
            content: content.to_string(),
            timestamp: Some(format_timestamp(at)),
        };
        format!("{}\n", serde_json::to_string(&record).unwrap_or_default())
    }

    fn decode(&self, document: &str) -> Vec<Message> {
        document
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str::<TurnRecord>(line).ok())
            .map(|record| Message::new(record.role, record.content))
            .collect()
    }
}
