mod config;
pub mod history;
pub mod json_path;
pub mod kv;
pub mod presets;
pub mod settings;

pub use config::{Config, LogConfig, StorageConfig};
pub use history::{HistoryStats, HistoryStore, WorkoutHistoryEntry, WorkoutType, MAX_HISTORY_ENTRIES};
pub use kv::{KeyValueStore, MemoryStore, SqliteStore};
pub use presets::{builtin_presets, find_builtin, Preset, PresetCatalog, PresetPatch};
pub use settings::{
    AppPreferences, GeneralSettings, HapticStrength, Setting, Settings, SoundSettings,
    SpeechSettings, StorageKey, Theme, UserProfile, ViewMode,
};

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Returns `~/.config/intervalo[-dev]/` based on INTERVALO_ENV.
///
/// Set INTERVALO_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("INTERVALO_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("intervalo-dev")
    } else {
        base_dir.join("intervalo")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Open the SQLite store named by `config`.
pub fn open_store(config: &Config) -> Result<SqliteStore> {
    let path = config.database_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    SqliteStore::open(&path)
}
