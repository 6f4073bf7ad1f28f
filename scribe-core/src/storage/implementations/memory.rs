//! In-memory ObjectStore implementation

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use crate::storage::traits::{ObjectEntry, ObjectKind, ObjectStore};
use crate::storage::{normalize_folder, split_path};

#[derive(Clone, Debug)]
struct StoredObject {
    content: String,
    last_modified: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Inner {
    objects: BTreeMap<String, StoredObject>,
    folders: BTreeSet<String>,
}

/// In-memory object store for testing
///
/// Uploading an object implicitly creates its folder, like the remote store.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    inner: Mutex<Inner>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the last-modified time of an object (for ordering tests)
    pub fn set_last_modified(&self, path: &str, at: DateTime<Utc>) -> Result<()> {
        let mut inner = self.lock()?;
        match inner.objects.get_mut(path) {
            Some(object) => {
                object.last_modified = at;
                Ok(())
            }
            None => bail!("Object not found: {}", path),
        }
    }

    /// Raw content of an object, if present
    pub fn content(&self, path: &str) -> Option<String> {
        self.inner
            .lock()
            .ok()?
            .objects
            .get(path)
            .map(|o| o.content.clone())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|i| i.objects.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn ensure_folder(&self, folder: &str) -> Result<()> {
        self.lock()?.folders.insert(normalize_folder(folder));
        Ok(())
    }

    async fn put(&self, path: &str, content: &str, _content_type: &str) -> Result<()> {
        let (folder, _) = split_path(path);
        let mut inner = self.lock()?;
        inner.folders.insert(normalize_folder(folder));
        inner.objects.insert(
            path.to_string(),
            StoredObject {
                content: content.to_string(),
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<String> {
        match self.lock()?.objects.get(path) {
            Some(object) => Ok(object.content.clone()),
            None => bail!("Object not found: {}", path),
        }
    }

    async fn list_folder(&self, folder: &str, limit: usize) -> Result<Vec<ObjectEntry>> {
        let folder = normalize_folder(folder);
        let inner = self.lock()?;
        if !inner.folders.contains(&folder) {
            bail!("Folder not found: {}", folder);
        }

        let subfolders = inner
            .folders
            .iter()
            .filter(|f| *f != &folder && normalize_folder(split_path(f).0) == folder)
            .map(|f| ObjectEntry {
                path: f.clone(),
                kind: ObjectKind::Folder,
                last_modified: DateTime::<Utc>::default(),
            });
        let files = inner
            .objects
            .iter()
            .filter(|(path, _)| normalize_folder(split_path(path).0) == folder)
            .map(|(path, object)| ObjectEntry {
                path: path.clone(),
                kind: ObjectKind::File,
                last_modified: object.last_modified,
            });

        Ok(subfolders.chain(files).take(limit).collect())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        match self.lock()?.objects.remove(path) {
            Some(_) => Ok(()),
            None => bail!("Object not found: {}", path),
        }
    }
}
