//! ObjectStore trait for path-addressed text objects

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    File,
    Folder,
}

/// One entry of a folder listing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectEntry {
    /// Absolute object path, e.g. `/chat-data/<id>.md`
    pub path: String,
    pub kind: ObjectKind,
    pub last_modified: DateTime<Utc>,
}

/// Remote file storage as the chat store needs it.
///
/// Paths are absolute and `/`-separated. No versioning or conditional
/// writes are assumed: `put` is a plain overwrite.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Create the folder if it does not exist yet
    async fn ensure_folder(&self, folder: &str) -> Result<()>;

    /// Upload `content`, replacing any existing object at `path`
    async fn put(&self, path: &str, content: &str, content_type: &str) -> Result<()>;

    /// Download an object; fails if it does not exist
    async fn get(&self, path: &str) -> Result<String>;

    /// Non-recursive listing of at most `limit` entries; fails for a missing folder
    async fn list_folder(&self, folder: &str, limit: usize) -> Result<Vec<ObjectEntry>>;

    /// Remove an object
    async fn delete(&self, path: &str) -> Result<()>;
}
