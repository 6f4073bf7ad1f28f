use directories::BaseDirs;
use std::path::PathBuf;

pub struct PathManager;

impl PathManager {
    pub fn data_dir() -> Option<PathBuf> {
        BaseDirs::new().map(|d| d.data_dir().join("scribe"))
    }

    pub fn config_dir() -> Option<PathBuf> {
        BaseDirs::new().map(|d| d.config_dir().join("scribe"))
    }

    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("settings.toml"))
    }

    /// Root directory of the local filesystem object store
    pub fn objects_dir() -> Option<PathBuf> {
        Self::data_dir().map(|d| d.join("objects"))
    }
}
