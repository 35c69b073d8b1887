//! Typed accessors over the persisted settings blobs.
//!
//! Each blob is stored as JSON under a fixed [`StorageKey`]. Reads merge
//! with defaults: missing fields take their default value, unknown fields
//! are ignored, and an unreadable blob yields the full default after a
//! logged warning. Writes return errors and leave the choice of logging
//! or propagating to the caller.

use std::convert::identity;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::history::WorkoutHistory;
use super::json_path;
use super::kv::KeyValueStore;
use super::presets::{ActiveProfileId, UserPresets};
use crate::error::{CoreError, Result, StorageError, ValidationError};
use crate::i18n::Language;
use crate::timer::{TimerConfig, TimerConfigPatch};

/// Fixed keys of every persisted blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Settings,
    Profile,
    TimerConfig,
    SoundSettings,
    AppPreferences,
    WorkoutProfiles,
    ActiveProfileId,
    WorkoutHistory,
    ViewMode,
    SpeechSettings,
}

impl StorageKey {
    pub const ALL: [StorageKey; 10] = [
        StorageKey::Settings,
        StorageKey::Profile,
        StorageKey::TimerConfig,
        StorageKey::SoundSettings,
        StorageKey::AppPreferences,
        StorageKey::WorkoutProfiles,
        StorageKey::ActiveProfileId,
        StorageKey::WorkoutHistory,
        StorageKey::ViewMode,
        StorageKey::SpeechSettings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Settings => "settings",
            StorageKey::Profile => "profile",
            StorageKey::TimerConfig => "timer_config",
            StorageKey::SoundSettings => "sound_settings",
            StorageKey::AppPreferences => "app_preferences",
            StorageKey::WorkoutProfiles => "workout_profiles",
            StorageKey::ActiveProfileId => "active_profile_id",
            StorageKey::WorkoutHistory => "workout_history",
            StorageKey::ViewMode => "view_mode",
            StorageKey::SpeechSettings => "speech_settings",
        }
    }

    /// Keys whose fields can be edited by path. Lists are managed through
    /// the preset catalog and history store instead.
    pub fn is_editable(&self) -> bool {
        !matches!(
            self,
            StorageKey::WorkoutProfiles | StorageKey::ActiveProfileId | StorageKey::WorkoutHistory
        )
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StorageKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StorageKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownKey(s.to_string()))
    }
}

/// A value persisted under its own storage key.
pub trait Setting: Serialize + DeserializeOwned + Default {
    const KEY: StorageKey;
}

// ── Settings blobs ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// General app settings (`settings` key).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneralSettings {
    pub language: Language,
    pub theme: Theme,
    pub keep_screen_on: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            language: Language::En,
            theme: Theme::System,
            keep_screen_on: true,
        }
    }
}

/// User profile (`profile` key).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserProfile {
    pub display_name: String,
    pub weight_kg: Option<f32>,
}

/// Sound cue settings (`sound_settings` key).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SoundSettings {
    pub enabled: bool,
    /// 0..=100
    pub volume: u8,
    pub sound: String,
    pub round_start: bool,
    pub rest_start: bool,
    pub countdown: bool,
    pub halfway: bool,
    pub workout_complete: bool,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 80,
            sound: "beep".into(),
            round_start: true,
            rest_start: true,
            countdown: true,
            halfway: true,
            workout_complete: true,
        }
    }
}

/// Text-to-speech settings (`speech_settings` key).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpeechSettings {
    pub enabled: bool,
    pub rate: f32,
    pub pitch: f32,
    pub announce_rounds: bool,
    pub announce_countdown: bool,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            rate: 1.0,
            pitch: 1.0,
            announce_rounds: true,
            announce_countdown: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HapticStrength {
    Light,
    #[default]
    Medium,
    Heavy,
}

/// Device behaviour preferences (`app_preferences` key).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppPreferences {
    pub vibration_enabled: bool,
    pub haptic_strength: HapticStrength,
    pub show_total_remaining: bool,
}

impl Default for AppPreferences {
    fn default() -> Self {
        Self {
            vibration_enabled: true,
            haptic_strength: HapticStrength::Medium,
            show_total_remaining: true,
        }
    }
}

/// Preset list layout (`view_mode` key).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl Setting for GeneralSettings {
    const KEY: StorageKey = StorageKey::Settings;
}
impl Setting for UserProfile {
    const KEY: StorageKey = StorageKey::Profile;
}
impl Setting for TimerConfig {
    const KEY: StorageKey = StorageKey::TimerConfig;
}
impl Setting for SoundSettings {
    const KEY: StorageKey = StorageKey::SoundSettings;
}
impl Setting for SpeechSettings {
    const KEY: StorageKey = StorageKey::SpeechSettings;
}
impl Setting for AppPreferences {
    const KEY: StorageKey = StorageKey::AppPreferences;
}
impl Setting for ViewMode {
    const KEY: StorageKey = StorageKey::ViewMode;
}

// ── Accessor ─────────────────────────────────────────────────────────

/// Settings accessor over a key-value store.
///
/// Created once and passed to whatever needs settings; there is no global
/// instance.
pub struct Settings<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> Settings<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// Load `T`, falling back to defaults on any failure.
    pub fn load<T: Setting>(&self) -> T {
        match self.try_load::<T>() {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %T::KEY, error = %e, "failed to read setting, using defaults");
                T::default()
            }
        }
    }

    /// Load `T`, surfacing storage and decoding errors.
    pub fn try_load<T: Setting>(&self) -> Result<T> {
        match self.store.get(T::KEY.as_str())? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| {
                StorageError::Encode {
                    key: T::KEY.to_string(),
                    source,
                }
                .into()
            }),
            None => Ok(T::default()),
        }
    }

    pub fn save<T: Setting>(&self, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: T::KEY.to_string(),
            source,
        })?;
        self.store.set(T::KEY.as_str(), &raw)?;
        debug!(key = %T::KEY, "setting saved");
        Ok(())
    }

    /// Load, mutate, persist. Returns the stored value.
    pub fn update<T: Setting>(&self, f: impl FnOnce(&mut T)) -> Result<T> {
        let mut value = self.load::<T>();
        f(&mut value);
        self.save(&value)?;
        Ok(value)
    }

    /// Remove the blob so the next read yields defaults.
    pub fn reset(&self, key: StorageKey) -> Result<()> {
        self.store.remove(key.as_str())
    }

    // ── Timer configuration store ────────────────────────────────────

    pub fn timer_config(&self) -> TimerConfig {
        self.load::<TimerConfig>()
    }

    /// Apply a partial update, clamp, persist. Last write wins.
    pub fn update_timer_config(&self, patch: &TimerConfigPatch) -> Result<TimerConfig> {
        self.update::<TimerConfig>(|cfg| *cfg = cfg.merged(patch).clamped())
    }

    // ── Dynamic access by key ────────────────────────────────────────

    /// Current (default-merged) value of any key as JSON.
    pub fn get_value(&self, key: StorageKey) -> Result<Value> {
        let value = match key {
            StorageKey::Settings => serde_json::to_value(self.load::<GeneralSettings>()),
            StorageKey::Profile => serde_json::to_value(self.load::<UserProfile>()),
            StorageKey::TimerConfig => serde_json::to_value(self.load::<TimerConfig>()),
            StorageKey::SoundSettings => serde_json::to_value(self.load::<SoundSettings>()),
            StorageKey::AppPreferences => serde_json::to_value(self.load::<AppPreferences>()),
            StorageKey::WorkoutProfiles => serde_json::to_value(self.load::<UserPresets>()),
            StorageKey::ActiveProfileId => serde_json::to_value(self.load::<ActiveProfileId>()),
            StorageKey::WorkoutHistory => serde_json::to_value(self.load::<WorkoutHistory>()),
            StorageKey::ViewMode => serde_json::to_value(self.load::<ViewMode>()),
            StorageKey::SpeechSettings => serde_json::to_value(self.load::<SpeechSettings>()),
        }?;
        Ok(value)
    }

    /// Set one field of an editable blob from its textual form.
    ///
    /// An empty `path` replaces the whole value (used for `view_mode`).
    pub fn set_path(&self, key: StorageKey, path: &str, value: &str) -> Result<Value> {
        match key {
            StorageKey::Settings => self.set_path_typed::<GeneralSettings>(path, value, identity),
            StorageKey::Profile => self.set_path_typed::<UserProfile>(path, value, identity),
            // Clamped before the write, like every other timer-config save.
            StorageKey::TimerConfig => self.set_path_typed(path, value, TimerConfig::clamped),
            StorageKey::SoundSettings => self.set_path_typed::<SoundSettings>(path, value, identity),
            StorageKey::AppPreferences => {
                self.set_path_typed::<AppPreferences>(path, value, identity)
            }
            StorageKey::ViewMode => self.set_path_typed::<ViewMode>(path, value, identity),
            StorageKey::SpeechSettings => {
                self.set_path_typed::<SpeechSettings>(path, value, identity)
            }
            StorageKey::WorkoutProfiles
            | StorageKey::ActiveProfileId
            | StorageKey::WorkoutHistory => Err(ValidationError::InvalidValue {
                field: key.to_string(),
                message: "list values cannot be edited by path".into(),
            }
            .into()),
        }
    }

    fn set_path_typed<T: Setting>(
        &self,
        path: &str,
        value: &str,
        normalize: impl FnOnce(T) -> T,
    ) -> Result<Value> {
        let mut json = serde_json::to_value(self.load::<T>())?;
        json_path::set(&mut json, path, value)?;
        let typed: T = serde_json::from_value(json).map_err(|e| {
            CoreError::from(ValidationError::InvalidValue {
                field: format!("{}.{}", T::KEY, path),
                message: e.to_string(),
            })
        })?;
        let typed = normalize(typed);
        self.save(&typed)?;
        Ok(serde_json::to_value(typed)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;

    #[test]
    fn missing_blob_yields_defaults() {
        let store = MemoryStore::new();
        let settings = Settings::new(&store);
        assert_eq!(settings.load::<SoundSettings>(), SoundSettings::default());
        assert_eq!(settings.timer_config(), TimerConfig::default());
    }

    #[test]
    fn partial_blob_merges_with_defaults() {
        let store = MemoryStore::new();
        store
            .set("sound_settings", r#"{"volume": 30, "legacyField": 1}"#)
            .unwrap();
        let sound = Settings::new(&store).load::<SoundSettings>();
        assert_eq!(sound.volume, 30);
        assert!(sound.enabled);
        assert_eq!(sound.sound, "beep");
    }

    #[test]
    fn corrupt_blob_falls_back_but_try_load_reports() {
        let store = MemoryStore::new();
        store.set("speech_settings", "{not json").unwrap();
        let settings = Settings::new(&store);
        assert_eq!(settings.load::<SpeechSettings>(), SpeechSettings::default());
        assert!(settings.try_load::<SpeechSettings>().is_err());
    }

    #[test]
    fn timer_config_partial_update_keeps_other_fields() {
        let store = MemoryStore::new();
        let settings = Settings::new(&store);
        settings
            .save(&TimerConfig::new(5, 40, 20, 6))
            .unwrap();
        let updated = settings
            .update_timer_config(&TimerConfigPatch {
                rounds: Some(10),
                exercise_time: Some(0),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(updated, TimerConfig::new(5, 1, 20, 10));
        assert_eq!(settings.timer_config(), updated);
    }

    #[test]
    fn set_path_validates_shape() {
        let store = MemoryStore::new();
        let settings = Settings::new(&store);
        let v = settings
            .set_path(StorageKey::SoundSettings, "volume", "55")
            .unwrap();
        assert_eq!(v["volume"], json!(55));
        assert_eq!(settings.load::<SoundSettings>().volume, 55);

        // Out of range for u8.
        assert!(settings
            .set_path(StorageKey::SoundSettings, "volume", "300")
            .is_err());
        assert!(settings
            .set_path(StorageKey::Settings, "theme", "neon")
            .is_err());
        assert!(settings
            .set_path(StorageKey::WorkoutHistory, "", "[]")
            .is_err());
    }

    #[test]
    fn set_path_replaces_scalar_blob() {
        let store = MemoryStore::new();
        let settings = Settings::new(&store);
        settings.set_path(StorageKey::ViewMode, "", "list").unwrap();
        assert_eq!(settings.load::<ViewMode>(), ViewMode::List);
    }

    #[test]
    fn set_path_clamps_timer_config() {
        let store = MemoryStore::new();
        let settings = Settings::new(&store);
        settings
            .set_path(StorageKey::TimerConfig, "exerciseTime", "0")
            .unwrap();
        assert_eq!(settings.timer_config().exercise_time, 1);
    }

    /// Records every value written through it.
    #[derive(Default)]
    struct WriteLog {
        inner: MemoryStore,
        writes: std::sync::Mutex<Vec<(String, String)>>,
    }

    impl KeyValueStore for WriteLog {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            if let Ok(mut writes) = self.writes.lock() {
                writes.push((key.to_string(), value.to_string()));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }

        fn keys(&self) -> Result<Vec<String>> {
            self.inner.keys()
        }
    }

    #[test]
    fn set_path_never_writes_unclamped_timer_config() {
        let store = WriteLog::default();
        let updated = Settings::new(&store)
            .set_path(StorageKey::TimerConfig, "rounds", "500")
            .unwrap();
        assert_eq!(updated["rounds"], 99);

        let writes = store.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        let (key, raw) = &writes[0];
        assert_eq!(key, "timer_config");
        let saved: TimerConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(saved.rounds, 99);
    }

    #[test]
    fn reset_restores_defaults() {
        let store = MemoryStore::new();
        let settings = Settings::new(&store);
        settings.update::<AppPreferences>(|p| p.vibration_enabled = false).unwrap();
        settings.reset(StorageKey::AppPreferences).unwrap();
        assert!(settings.load::<AppPreferences>().vibration_enabled);
    }

    #[test]
    fn storage_keys_parse() {
        for key in StorageKey::ALL {
            assert_eq!(key.as_str().parse::<StorageKey>().unwrap(), key);
        }
        assert!("theme".parse::<StorageKey>().is_err());
    }
}
