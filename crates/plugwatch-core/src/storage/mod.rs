mod config;
pub mod database;
pub mod migrations;

pub use config::{Config, TuyaConfig};
pub use database::SqliteEventStore;

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Returns `~/.config/plugwatch[-dev]/` based on PLUGWATCH_ENV.
///
/// Set PLUGWATCH_ENV=dev to use development data directory. The directory
/// is not created here; writers call [`ensure_dir`] first.
pub fn data_dir() -> PathBuf {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("PLUGWATCH_ENV").unwrap_or_else(|_| "production".to_string());

    if env == "dev" {
        base_dir.join("plugwatch-dev")
    } else {
        base_dir.join("plugwatch")
    }
}

/// Create `dir` and its parents if missing.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn ensure_dir(dir: &Path) -> Result<(), ConfigError> {
    std::fs::create_dir_all(dir).map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))
}
