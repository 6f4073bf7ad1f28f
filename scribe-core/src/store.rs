//! Chat persistence on top of an object store
//!
//! Each chat is one transcript object `<folder>/<chat id>.<ext>`. The object
//! store is the only state: nothing is cached between calls.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::StoreError;
use crate::ids::ChatId;
use crate::storage::{ObjectEntry, ObjectKind, ObjectStore, normalize_folder, split_path};
use crate::transcript::{MarkdownCodec, Message, Role, TranscriptCodec};

/// Listing cap; chats beyond it are not returned
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Preview shown for chats without a readable first user message
pub const DEFAULT_PREVIEW: &str = "New Chat";

/// One row of the chat list, derived on every listing
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatSummary {
    pub id: ChatId,
    pub preview: String,
    pub timestamp: DateTime<Utc>,
}

pub struct ChatStore {
    objects: Arc<dyn ObjectStore>,
    codec: Arc<dyn TranscriptCodec>,
    folder: String,
}

impl ChatStore {
    /// Store markdown transcripts in `folder`
    pub fn new(objects: Arc<dyn ObjectStore>, folder: impl Into<String>) -> Self {
        Self::with_codec(objects, folder, Arc::new(MarkdownCodec))
    }

    pub fn with_codec(
        objects: Arc<dyn ObjectStore>,
        folder: impl Into<String>,
        codec: Arc<dyn TranscriptCodec>,
    ) -> Self {
        let folder = normalize_folder(&folder.into());
        Self {
            objects,
            codec,
            folder,
        }
    }

    /// Object path of a chat's transcript
    pub fn object_path(&self, id: &ChatId) -> String {
        format!(
            "{}/{}.{}",
            self.folder.trim_end_matches('/'),
            id,
            self.codec.extension()
        )
    }

    /// Write a header-only transcript for a new chat.
    #[instrument(level = "debug", skip(self))]
    pub async fn create(&self, id: &ChatId) -> Result<(), StoreError> {
        self.objects
            .ensure_folder(&self.folder)
            .await
            .map_err(|source| StoreError::Write {
                path: self.folder.clone(),
                source,
            })?;

        let path = self.object_path(id);
        let header = self.codec.encode_header(id, Utc::now());
        self.write(&path, &header).await?;
        info!(chat_id = %id, "Created chat");
        Ok(())
    }

    /// Append one turn to a chat.
    ///
    /// This is a blind read-modify-write: two appends racing on the same chat
    /// can both read the same base and the later write drops the other turn.
    #[instrument(level = "debug", skip(self, content))]
    pub async fn append(&self, id: &ChatId, role: Role, content: &str) -> Result<(), StoreError> {
        let path = self.object_path(id);
        let now = Utc::now();

        let current = match self.objects.get(&path).await {
            Ok(document) => document,
            Err(e) => {
                debug!(chat_id = %id, "No transcript to append to, starting a new one: {}", e);
                self.codec.encode_header(id, now)
            }
        };

        let updated = current + &self.codec.encode_turn(role, content, now);
        self.write(&path, &updated).await
    }

    /// Ordered turns of a chat; empty if the chat does not exist or cannot be read.
    #[instrument(level = "debug", skip(self))]
    pub async fn read_history(&self, id: &ChatId) -> Vec<Message> {
        match self.objects.get(&self.object_path(id)).await {
            Ok(document) => self.codec.decode(&document),
            Err(e) => {
                debug!(chat_id = %id, "Reading history failed, treating chat as empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Summaries of up to `limit` chats, most recently modified first.
    ///
    /// Never fails: a missing folder lists as empty, and a chat whose
    /// transcript cannot be read keeps the default preview.
    #[instrument(level = "debug", skip(self))]
    pub async fn list(&self, limit: usize) -> Vec<ChatSummary> {
        let entries = match self.objects.list_folder(&self.folder, limit).await {
            Ok(entries) => entries,
            Err(e) => {
                debug!(folder = %self.folder, "Listing chats failed, returning none: {}", e);
                return Vec::new();
            }
        };

        let suffix = format!(".{}", self.codec.extension());
        let transcripts = entries
            .into_iter()
            .filter(|entry| entry.kind == ObjectKind::File)
            .filter(|entry| entry.path.to_lowercase().ends_with(&suffix));

        let mut summaries = join_all(transcripts.map(|entry| self.summarize(entry, &suffix))).await;
        summaries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        summaries
    }

    async fn summarize(&self, entry: ObjectEntry, suffix: &str) -> ChatSummary {
        let (_, file_name) = split_path(&entry.path);
        let stem = file_name
            .get(..file_name.len().saturating_sub(suffix.len()))
            .unwrap_or(file_name);
        let id = ChatId::from_string(stem);

        let preview = match self.objects.get(&entry.path).await {
            Ok(document) => self.codec.preview(&document),
            Err(e) => {
                warn!(path = %entry.path, "Could not read transcript for preview: {}", e);
                None
            }
        };

        ChatSummary {
            id,
            preview: preview.unwrap_or_else(|| DEFAULT_PREVIEW.to_string()),
            timestamp: entry.last_modified,
        }
    }

    /// Remove a chat's transcript.
    #[instrument(level = "debug", skip(self))]
    pub async fn delete(&self, id: &ChatId) -> Result<(), StoreError> {
        let path = self.object_path(id);
        self.objects
            .delete(&path)
            .await
            .map_err(|source| StoreError::Delete { path, source })?;
        info!(chat_id = %id, "Deleted chat");
        Ok(())
    }

    async fn write(&self, path: &str, document: &str) -> Result<(), StoreError> {
        self.objects
            .put(path, document, self.codec.content_type())
            .await
            .map_err(|source| StoreError::Write {
                path: path.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryObjectStore;
    use crate::transcript::JsonlCodec;
    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::TimeZone;

    fn memory_store() -> (Arc<MemoryObjectStore>, ChatStore) {
        let objects = Arc::new(MemoryObjectStore::new());
        let store = ChatStore::new(objects.clone(), "/chat-data");
        (objects, store)
    }

    /// Object store whose writes and deletes always fail
    struct ReadOnlyStore(MemoryObjectStore);

    #[async_trait]
    impl ObjectStore for ReadOnlyStore {
        async fn ensure_folder(&self, folder: &str) -> Result<()> {
            self.0.ensure_folder(folder).await
        }
        async fn put(&self, _path: &str, _content: &str, _content_type: &str) -> Result<()> {
            anyhow::bail!("quota exceeded")
        }
        async fn get(&self, path: &str) -> Result<String> {
            self.0.get(path).await
        }
        async fn list_folder(&self, folder: &str, limit: usize) -> Result<Vec<ObjectEntry>> {
            self.0.list_folder(folder, limit).await
        }
        async fn delete(&self, _path: &str) -> Result<()> {
            anyhow::bail!("forbidden")
        }
    }

    #[tokio::test]
    async fn test_object_path() {
        let (_, store) = memory_store();
        let id = ChatId::from_string("abc");
        assert_eq!(store.object_path(&id), "/chat-data/abc.md");

        let jsonl = ChatStore::with_codec(
            Arc::new(MemoryObjectStore::new()),
            "/chat-data/",
            Arc::new(JsonlCodec),
        );
        assert_eq!(jsonl.object_path(&id), "/chat-data/abc.jsonl");
    }

    #[tokio::test]
    async fn test_folder_without_leading_slash_is_rooted() {
        let objects = Arc::new(MemoryObjectStore::new());
        let store = ChatStore::new(objects.clone(), "chat-data");
        let id = ChatId::new();
        assert_eq!(store.object_path(&id), format!("/chat-data/{}.md", id));

        store.append(&id, Role::User, "hi").await.unwrap();
        assert_eq!(store.read_history(&id).await, vec![Message::user("hi")]);

        let listed = store.list(DEFAULT_LIST_LIMIT).await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);

        let root = ChatStore::new(Arc::new(MemoryObjectStore::new()), "/");
        assert_eq!(root.object_path(&id), format!("/{}.md", id));
    }

    #[tokio::test]
    async fn test_create_writes_header_only() {
        let (objects, store) = memory_store();
        let id = ChatId::new();
        store.create(&id).await.unwrap();

        let document = objects.content(&store.object_path(&id)).unwrap();
        assert!(document.starts_with(&format!("# Chat ID: {}\n# Created: ", id)));
        assert!(document.ends_with("\n\n"));
        assert!(store.read_history(&id).await.is_empty());
    }

    #[tokio::test]
    async fn test_append_round_trip() {
        let (_, store) = memory_store();
        let id = ChatId::new();
        store.create(&id).await.unwrap();
        store.append(&id, Role::User, "hi").await.unwrap();
        store.append(&id, Role::Model, "hello").await.unwrap();

        assert_eq!(
            store.read_history(&id).await,
            vec![Message::user("hi"), Message::model("hello")]
        );
    }

    #[tokio::test]
    async fn test_append_to_missing_chat_synthesizes_header() {
        let (objects, store) = memory_store();
        let id = ChatId::new();
        store.append(&id, Role::User, "first").await.unwrap();

        let document = objects.content(&store.object_path(&id)).unwrap();
        assert!(document.starts_with(&format!("# Chat ID: {}\n", id)));
        assert_eq!(store.read_history(&id).await, vec![Message::user("first")]);
    }

    #[tokio::test]
    async fn test_read_missing_chat_is_empty() {
        let (_, store) = memory_store();
        assert!(store.read_history(&ChatId::new()).await.is_empty());
    }

    #[tokio::test]
    async fn test_write_failures_propagate() {
        let store = ChatStore::new(Arc::new(ReadOnlyStore(MemoryObjectStore::new())), "/chat-data");
        let id = ChatId::new();

        match store.create(&id).await {
            Err(StoreError::Write { path, source }) => {
                assert_eq!(path, store.object_path(&id));
                assert_eq!(source.to_string(), "quota exceeded");
            }
            other => panic!("expected write error, got {:?}", other),
        }
        assert!(matches!(
            store.append(&id, Role::User, "x").await,
            Err(StoreError::Write { .. })
        ));
        assert!(matches!(
            store.delete(&id).await,
            Err(StoreError::Delete { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let (objects, store) = memory_store();
        let id = ChatId::new();
        store.create(&id).await.unwrap();
        store.delete(&id).await.unwrap();

        assert!(objects.is_empty());
        assert!(store.read_history(&id).await.is_empty());
        assert!(store.delete(&id).await.is_err());
    }

    #[tokio::test]
    async fn test_list_missing_folder_is_empty() {
        let (_, store) = memory_store();
        assert!(store.list(DEFAULT_LIST_LIMIT).await.is_empty());
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let (objects, store) = memory_store();
        let ids: Vec<ChatId> = (0..3).map(|_| ChatId::new()).collect();
        for (i, id) in ids.iter().enumerate() {
            store.create(id).await.unwrap();
            store
                .append(id, Role::User, &format!("question {}", i))
                .await
                .unwrap();
            let at = Utc.with_ymd_and_hms(2025, 1, 1 + i as u32, 0, 0, 0).unwrap();
            objects.set_last_modified(&store.object_path(id), at).unwrap();
        }

        let listed = store.list(DEFAULT_LIST_LIMIT).await;
        let listed_ids: Vec<_> = listed.iter().map(|s| s.id.clone()).collect();
        assert_eq!(listed_ids, vec![ids[2].clone(), ids[1].clone(), ids[0].clone()]);
        assert_eq!(listed[0].preview, "question 2");
        assert_eq!(
            listed[2].timestamp,
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_list_previews_and_filters() {
        let (objects, store) = memory_store();
        let fresh = ChatId::new();
        store.create(&fresh).await.unwrap();

        let talkative = ChatId::new();
        store
            .append(&talkative, Role::User, "Please summarise this very long document for me")
            .await
            .unwrap();

        objects
            .put("/chat-data/notes.txt", "ignored", "text/plain")
            .await
            .unwrap();
        objects
            .put("/chat-data/UPPER.MD", "### USER\nshouting", "text/markdown")
            .await
            .unwrap();
        objects.ensure_folder("/chat-data/archive.md").await.unwrap();

        let listed = store.list(DEFAULT_LIST_LIMIT).await;
        assert_eq!(listed.len(), 3);

        let preview_of = |id: &str| {
            listed
                .iter()
                .find(|s| s.id.as_str() == id)
                .map(|s| s.preview.clone())
        };
        assert_eq!(preview_of(fresh.as_str()).as_deref(), Some(DEFAULT_PREVIEW));
        assert_eq!(
            preview_of(talkative.as_str()).as_deref(),
            Some("Please summarise this very lon...")
        );
        assert_eq!(preview_of("UPPER").as_deref(), Some("shouting"));
    }

    #[tokio::test]
    async fn test_list_applies_limit_before_filtering() {
        let (objects, store) = memory_store();
        for i in 0..4 {
            objects
                .put(&format!("/chat-data/{i}.md"), "", "text/markdown")
                .await
                .unwrap();
        }
        assert_eq!(store.list(2).await.len(), 2);
    }

    #[tokio::test]
    async fn test_jsonl_store_round_trip() {
        let objects = Arc::new(MemoryObjectStore::new());
        let store = ChatStore::with_codec(objects.clone(), "/chat-data", Arc::new(JsonlCodec));
        let id = ChatId::new();
        store.create(&id).await.unwrap();
        store.append(&id, Role::User, "### MODEL inside").await.unwrap();
        store.append(&id, Role::Model, "fine").await.unwrap();

        assert_eq!(
            store.read_history(&id).await,
            vec![Message::user("### MODEL inside"), Message::model("fine")]
        );
        // Markdown transcripts in the same folder are not listed.
        objects
            .put("/chat-data/other.md", "", "text/markdown")
            .await
            .unwrap();
        let listed = store.list(DEFAULT_LIST_LIMIT).await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
        assert_eq!(listed[0].preview, "### MODEL inside");
    }
}
