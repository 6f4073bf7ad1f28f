//! ChatEngine ties the chat store to the completion gateway.

use tracing::instrument;

use crate::error::StoreError;
use crate::gateway::{CompletionGateway, Reply};
use crate::ids::ChatId;
use crate::store::{ChatStore, ChatSummary, DEFAULT_LIST_LIMIT};
use crate::transcript::{Message, Role};

pub struct ChatEngine {
    store: ChatStore,
    gateway: CompletionGateway,
    list_limit: usize,
}

impl ChatEngine {
    pub fn new(store: ChatStore, gateway: CompletionGateway) -> Self {
        Self {
            store,
            gateway,
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }

    pub fn with_list_limit(mut self, limit: usize) -> Self {
        self.list_limit = limit;
        self
    }

    pub fn store(&self) -> &ChatStore {
        &self.store
    }

    pub fn gateway(&self) -> &CompletionGateway {
        &self.gateway
    }

    /// Start a chat under a fresh id.
    pub async fn new_chat(&self) -> Result<ChatId, StoreError> {
        let id = ChatId::new();
        self.store.create(&id).await?;
        Ok(id)
    }

    /// Persist `text` as a user turn, get the model's reply and persist it too.
    ///
    /// A failed completion still produces a (degraded) reply that is stored
    /// like any other; only storage writes can fail this call.
    #[instrument(level = "info", skip(self, text))]
    pub async fn send(&self, id: &ChatId, text: &str) -> Result<Reply, StoreError> {
        self.store.append(id, Role::User, text).await?;
        let history = self.store.read_history(id).await;
        let reply = self.gateway.generate_reply(&history, text).await;
        self.store.append(id, Role::Model, reply.text()).await?;
        Ok(reply)
    }

    pub async fn history(&self, id: &ChatId) -> Vec<Message> {
        self.store.read_history(id).await
    }

    pub async fn list(&self) -> Vec<ChatSummary> {
        self.store.list(self.list_limit).await
    }

    pub async fn delete(&self, id: &ChatId) -> Result<(), StoreError> {
        self.store.delete(id).await
    }
}
