//! Application settings management

use crate::PathManager;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_MODEL: &str = "models/gemini-2.5-flash";
pub const DEFAULT_FOLDER: &str = "/chat-data";

/// Which object store backs the transcripts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Bytescale,
    Fs,
    Memory,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bytescale" => Ok(StoreKind::Bytescale),
            "fs" => Ok(StoreKind::Fs),
            "memory" => Ok(StoreKind::Memory),
            _ => Err(format!("Unknown store: {}", s)),
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Bytescale => write!(f, "bytescale"),
            StoreKind::Fs => write!(f, "fs"),
            StoreKind::Memory => write!(f, "memory"),
        }
    }
}

/// On-disk encoding of a transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptFormat {
    #[default]
    Markdown,
    Jsonl,
}

impl FromStr for TranscriptFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(TranscriptFormat::Markdown),
            "jsonl" => Ok(TranscriptFormat::Jsonl),
            _ => Err(format!("Unknown transcript format: {}", s)),
        }
    }
}

impl fmt::Display for TranscriptFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptFormat::Markdown => write!(f, "markdown"),
            TranscriptFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// Application settings stored in settings.toml
///
/// API keys are never read from the file; they come from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub store: StoreKind,
    pub format: TranscriptFormat,
    /// Folder inside the object store that holds the transcripts
    pub folder: String,
    /// Gemini model id (e.g. "models/gemini-2.5-flash")
    pub model: String,
    pub gemini_base_url: Option<String>,
    pub bytescale_account_id: Option<String>,
    pub bytescale_api_url: Option<String>,
    pub bytescale_cdn_url: Option<String>,
    /// Reply persisted when the completion provider fails
    pub fallback_reply: Option<String>,
    /// Root for the `fs` store; defaults to the platform data dir
    pub data_dir: Option<PathBuf>,
    /// Listing cap; the chat store's default applies when unset
    pub list_limit: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store: StoreKind::default(),
            format: TranscriptFormat::default(),
            folder: DEFAULT_FOLDER.to_string(),
            model: DEFAULT_MODEL.to_string(),
            gemini_base_url: None,
            bytescale_account_id: None,
            bytescale_api_url: None,
            bytescale_cdn_url: None,
            fallback_reply: None,
            data_dir: None,
            list_limit: None,
        }
    }
}

impl Settings {
    /// Load settings from the settings file plus environment overrides.
    pub fn load() -> Self {
        let settings = match PathManager::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        };
        settings.with_overrides(|key| std::env::var(key).ok())
    }

    /// Load settings from a TOML file, or return defaults if missing or invalid
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };

        match toml::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Ignoring invalid settings file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Apply `SCRIBE_*`, `GEMINI_*` and `BYTESCALE_*` overrides from `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(store) = lookup("SCRIBE_STORE") {
            match store.parse() {
                Ok(store) => self.store = store,
                Err(e) => tracing::warn!("{}", e),
            }
        }
        if let Some(format) = lookup("SCRIBE_FORMAT") {
            match format.parse() {
                Ok(format) => self.format = format,
                Err(e) => tracing::warn!("{}", e),
            }
        }
        if let Some(folder) = lookup("SCRIBE_FOLDER") {
            self.folder = folder;
        }
        if let Some(model) = lookup("GEMINI_MODEL") {
            self.model = model;
        }
        if let Some(limit) = lookup("SCRIBE_LIST_LIMIT") {
            match limit.parse() {
                Ok(limit) => self.list_limit = Some(limit),
                Err(_) => tracing::warn!("Ignoring invalid SCRIBE_LIST_LIMIT: {}", limit),
            }
        }
        if let Some(dir) = lookup("SCRIBE_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }
        self.gemini_base_url = lookup("GEMINI_BASE_URL").or(self.gemini_base_url);
        self.bytescale_account_id = lookup("BYTESCALE_ACCOUNT_ID").or(self.bytescale_account_id);
        self.bytescale_api_url = lookup("BYTESCALE_API_URL").or(self.bytescale_api_url);
        self.bytescale_cdn_url = lookup("BYTESCALE_CDN_URL").or(self.bytescale_cdn_url);
        self.fallback_reply = lookup("SCRIBE_FALLBACK_REPLY").or(self.fallback_reply);
        self
    }

    /// Directory for the filesystem store
    pub fn objects_dir(&self) -> Option<PathBuf> {
        self.data_dir
            .clone()
            .map(|d| d.join("objects"))
            .or_else(PathManager::objects_dir)
    }

    pub fn gemini_api_key() -> Option<String> {
        std::env::var("GEMINI_API_KEY").ok()
    }

    pub fn bytescale_api_key() -> Option<String> {
        std::env::var("BYTESCALE_API_KEY").ok()
    }
}
