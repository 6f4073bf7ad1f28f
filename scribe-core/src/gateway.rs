//! Completion gateway: stored history in, one reply out.

use llm::{ChatMessage, ChatModel, ChatRequest};
use std::sync::Arc;
use tracing::{instrument, warn};

use crate::transcript::{Message, Role};

pub const DEFAULT_FALLBACK_REPLY: &str = "Sorry, something went wrong on our side. Please try again.";

/// Outcome of a completion. Both variants carry text the conversation can continue with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Text produced by the model, verbatim
    Generated(String),
    /// The provider failed; carries the fallback text instead
    Degraded(String),
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Reply::Generated(text) | Reply::Degraded(text) => text,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Reply::Degraded(_))
    }
}

pub struct CompletionGateway {
    model: Arc<dyn ChatModel + Send + Sync>,
    fallback: String,
}

impl CompletionGateway {
    pub fn new(model: Arc<dyn ChatModel + Send + Sync>) -> Self {
        Self {
            model,
            fallback: DEFAULT_FALLBACK_REPLY.to_string(),
        }
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Ask the model for the next turn.
    ///
    /// `history` is the stored transcript whose last entry is `new_message`
    /// itself; that entry is dropped so the message is sent exactly once.
    #[instrument(level = "debug", skip(self, history, new_message), fields(model = self.model.name(), turns = history.len()))]
    pub async fn generate_reply(&self, history: &[Message], new_message: &str) -> Reply {
        let request = build_request(history, new_message);

        match self.model.chat(&request).await {
            Ok(message) => Reply::Generated(message.content),
            Err(e) => {
                warn!("Completion failed, replying with fallback: {:#}", e);
                Reply::Degraded(self.fallback.clone())
            }
        }
    }
}

fn build_request(history: &[Message], new_message: &str) -> ChatRequest {
    let earlier = history.split_last().map(|(_, rest)| rest).unwrap_or(&[]);

    let mut messages: Vec<ChatMessage> = earlier
        .iter()
        .map(|m| match m.role {
            Role::User => ChatMessage::user(m.content.clone()),
            Role::Model => ChatMessage::assistant(m.content.clone()),
        })
        .collect();
    messages.push(ChatMessage::user(new_message));

    ChatRequest::new(messages)
}
