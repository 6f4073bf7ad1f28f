//! Bytescale ObjectStore implementation
//!
//! Uses the v2 REST API with a secret (`secret_...`) API key:
//!
//! - `PUT  /v2/accounts/{account}/folders` to create a folder
//! - `POST /v2/accounts/{account}/uploads/binary` to upload a file
//! - `GET  {cdn}/{account}/raw{path}` to download a file
//! - `GET  /v2/accounts/{account}/folders/list` to list a folder
//! - `DELETE /v2/accounts/{account}/files` to delete a file

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{Level, event, instrument};

use crate::storage::split_path;
use crate::storage::traits::{ObjectEntry, ObjectKind, ObjectStore};

pub const DEFAULT_API_URL: &str = "https://api.bytescale.com";
pub const DEFAULT_CDN_URL: &str = "https://upcdn.io";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PutFolderRequest<'a> {
    folder_path: &'a str,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum FolderItem {
    #[serde(rename_all = "camelCase")]
    File {
        file_path: String,
        #[serde(default)]
        last_modified: Option<i64>,
    },
    #[serde(rename_all = "camelCase")]
    Folder { folder_path: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct ListFolderResponse {
    #[serde(default)]
    items: Vec<FolderItem>,
}

#[derive(Debug, Clone)]
pub struct BytescaleStore {
    client: reqwest::Client,
    api_url: String,
    cdn_url: String,
    account_id: String,
}

impl BytescaleStore {
    pub fn new(account_id: &str, api_key: &str) -> Result<Self> {
        Self::with_urls(DEFAULT_API_URL, DEFAULT_CDN_URL, account_id, api_key)
    }

    pub fn with_urls(api_url: &str, cdn_url: &str, account_id: &str, api_key: &str) -> Result<Self> {
        if !api_key.starts_with("secret_") {
            tracing::warn!("Bytescale API key does not start with 'secret_'; writes will likely be rejected");
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .context("Bytescale API key is not a valid header value")?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);

        Ok(Self {
            client: reqwest::Client::builder().default_headers(headers).build()?,
            api_url: api_url.trim_end_matches('/').to_string(),
            cdn_url: cdn_url.trim_end_matches('/').to_string(),
            account_id: account_id.to_string(),
        })
    }

    fn account_url(&self, suffix: &str) -> String {
        format!("{}/v2/accounts/{}/{}", self.api_url, self.account_id, suffix)
    }

    async fn check(operation: &str, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(anyhow::anyhow!(
            "Bytescale {} failed with status: {} - {}",
            operation,
            status,
            body
        ))
    }
}

fn from_epoch_millis(millis: Option<i64>) -> DateTime<Utc> {
    millis
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .unwrap_or_default()
}

#[async_trait]
impl ObjectStore for BytescaleStore {
    #[instrument(level = "debug", skip(self))]
    async fn ensure_folder(&self, folder: &str) -> Result<()> {
        let response = self
            .client
            .put(self.account_url("folders"))
            .json(&PutFolderRequest {
                folder_path: folder,
            })
            .send()
            .await?;
        Self::check("putFolder", response).await?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self, content))]
    async fn put(&self, path: &str, content: &str, content_type: &str) -> Result<()> {
        let (folder, file_name) = split_path(path);
        let folder = if folder.is_empty() { "/" } else { folder };
        let response = self
            .client
            .post(self.account_url("uploads/binary"))
            .query(&[("folderPath", folder), ("fileName", file_name)])
            .header(header::CONTENT_TYPE, content_type)
            .body(content.to_string())
            .send()
            .await?;
        let response = Self::check("upload", response).await?;
        event!(Level::DEBUG, response = response.text().await.unwrap_or_default());
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn get(&self, path: &str) -> Result<String> {
        let url = format!("{}/{}/raw{}", self.cdn_url, self.account_id, path);
        let response = self
            .client
            .get(url)
            .query(&[("cache", "false")])
            .send()
            .await?;
        Ok(Self::check("download", response).await?.text().await?)
    }

    #[instrument(level = "debug", skip(self))]
    async fn list_folder(&self, folder: &str, limit: usize) -> Result<Vec<ObjectEntry>> {
        let limit = limit.to_string();
        let response = self
            .client
            .get(self.account_url("folders/list"))
            .query(&[
                ("folderPath", folder),
                ("recursive", "false"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;
        let text = Self::check("listFolder", response).await?.text().await?;
        let listing: ListFolderResponse = serde_json::from_str(&text)?;

        Ok(listing
            .items
            .into_iter()
            .filter_map(|item| match item {
                FolderItem::File {
                    file_path,
                    last_modified,
                } => Some(ObjectEntry {
                    path: file_path,
                    kind: ObjectKind::File,
                    last_modified: from_epoch_millis(last_modified),
                }),
                FolderItem::Folder { folder_path } => Some(ObjectEntry {
                    path: folder_path,
                    kind: ObjectKind::Folder,
                    last_modified: DateTime::<Utc>::default(),
                }),
                FolderItem::Other => None,
            })
            .collect())
    }

    #[instrument(level = "debug", skip(self))]
    async fn delete(&self, path: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.account_url("files"))
            .query(&[("filePath", path)])
            .send()
            .await?;
        Self::check("deleteFile", response).await?;
        Ok(())
    }
}
