pub mod paths;
pub mod settings;

pub use paths::PathManager;
pub use settings::{Settings, StoreKind, TranscriptFormat};

/// Load environment variables from .env files.
/// Loads ./.env (project directory), then ~/.env (home directory).
/// Variables already set are never overwritten, so the process environment
/// wins over the project file, which wins over the home file.
/// Call this before parsing CLI args to ensure env vars are available.
pub fn load_env_file() {
    dotenv::dotenv().ok();

    if let Some(home) = dirs::home_dir() {
        let home_env_path = home.join(".env");
        dotenv::from_path(home_env_path).ok();
    }
}
