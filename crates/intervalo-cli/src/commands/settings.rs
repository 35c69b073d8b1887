use clap::Subcommand;
use intervalo_core::storage::{json_path, Settings, StorageKey};

use super::{open_store, CmdResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// List every settings key with its current value
    List,
    /// Print one key, or one field of it
    Get {
        /// Storage key (e.g. "sound_settings")
        key: String,
        /// Dot-separated field path (e.g. "volume")
        path: Option<String>,
    },
    /// Set one field of a key
    Set {
        key: String,
        /// Dot-separated field path; empty replaces the whole value
        path: String,
        value: String,
    },
    /// Reset a key to its defaults
    Reset { key: String },
}

pub fn run(action: SettingsAction) -> CmdResult {
    let store = open_store()?;
    let settings = Settings::new(&store);

    match action {
        SettingsAction::List => {
            let mut all = serde_json::Map::new();
            for key in StorageKey::ALL {
                all.insert(key.to_string(), settings.get_value(key)?);
            }
            println!("{}", serde_json::to_string_pretty(&all)?);
        }
        SettingsAction::Get { key, path } => {
            let key: StorageKey = key.parse()?;
            let value = settings.get_value(key)?;
            let path = path.unwrap_or_default();
            let found = json_path::get(&value, &path)
                .ok_or_else(|| format!("unknown field: {key}.{path}"))?;
            println!("{}", serde_json::to_string_pretty(found)?);
        }
        SettingsAction::Set { key, path, value } => {
            let key: StorageKey = key.parse()?;
            if !key.is_editable() {
                return Err(format!("{key} is managed by the preset and history commands").into());
            }
            let updated = settings.set_path(key, &path, &value)?;
            println!("{}", serde_json::to_string_pretty(&updated)?);
        }
        SettingsAction::Reset { key } => {
            let key: StorageKey = key.parse()?;
            settings.reset(key)?;
            println!("{key} reset to defaults");
        }
    }
    Ok(())
}
