//! Filesystem ObjectStore implementation
//!
//! Object paths map onto a root directory: `/chat-data/<id>.md` lives at
//! `{root}/chat-data/<id>.md`.

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::storage::traits::{ObjectEntry, ObjectKind, ObjectStore};

#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an object path below the root, refusing `..` and the like
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            bail!("Invalid object path: {}", path);
        }
        Ok(self.root.join(relative))
    }

    /// Sibling of `target` named `.<file>.<uuid>.tmp`
    fn temp_path(target: &Path) -> PathBuf {
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        target.with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4()))
    }

    fn join_object_path(folder: &str, name: &str) -> String {
        let folder = folder.trim_end_matches('/');
        format!("{}/{}", folder, name)
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn ensure_folder(&self, folder: &str) -> Result<()> {
        fs::create_dir_all(self.resolve(folder)?).await?;
        Ok(())
    }

    async fn put(&self, path: &str, content: &str, _content_type: &str) -> Result<()> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write atomically through a temp file private to this write
        let temp_path = Self::temp_path(&target);
        let result = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(content.as_bytes()).await?;
            file.sync_all().await?;
            fs::rename(&temp_path, &target).await
        }
        .await;
        if result.is_err() {
            let _ = fs::remove_file(&temp_path).await;
        }
        Ok(result?)
    }

    async fn get(&self, path: &str) -> Result<String> {
        Ok(fs::read_to_string(self.resolve(path)?).await?)
    }

    async fn list_folder(&self, folder: &str, limit: usize) -> Result<Vec<ObjectEntry>> {
        let dir = self.resolve(folder)?;
        let mut reader = fs::read_dir(&dir).await?;
        let mut entries = Vec::new();

        while let Some(entry) = reader.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            let metadata = entry.metadata().await?;
            if metadata.is_file() && name.ends_with(".tmp") {
                continue;
            }

            entries.push(ObjectEntry {
                path: Self::join_object_path(folder, &name),
                kind: if metadata.is_dir() {
                    ObjectKind::Folder
                } else {
                    ObjectKind::File
                },
                last_modified: metadata
                    .modified()
                    .map(DateTime::<Utc>::from)
                    .unwrap_or_default(),
            });
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries.truncate(limit);
        Ok(entries)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        fs::remove_file(self.resolve(path)?).await?;
        Ok(())
    }
}
