//! Preset catalog: built-in workouts plus user-defined profiles.
//!
//! Built-ins live in code; user presets are stored under
//! `workout_profiles`. The catalog concatenates both at read time with no
//! deduplication. The selected preset id is stored under
//! `active_profile_id`.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::kv::KeyValueStore;
use super::settings::{Setting, Settings, StorageKey};
use crate::error::{Result, ValidationError};
use crate::timer::{TimerConfig, TimerConfigPatch};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub config: TimerConfig,
    #[serde(default, skip_serializing)]
    pub builtin: bool,
}

/// User presets as persisted under `workout_profiles`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserPresets(pub Vec<Preset>);

impl Setting for UserPresets {
    const KEY: StorageKey = StorageKey::WorkoutProfiles;
}

/// Selected preset id as persisted under `active_profile_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActiveProfileId(pub Option<String>);

impl Setting for ActiveProfileId {
    const KEY: StorageKey = StorageKey::ActiveProfileId;
}

/// Returns all built-in presets.
pub fn builtin_presets() -> Vec<Preset> {
    vec![
        builtin(
            "tabata",
            "Tabata",
            "hiit",
            indoc::indoc! {"
                Eight rounds of 20 seconds all-out effort and 10 seconds rest.
                Four minutes that feel much longer.
            "},
            TimerConfig::new(10, 20, 10, 8),
        ),
        builtin(
            "hiit-30-30",
            "HIIT 30/30",
            "hiit",
            "Equal work and rest, ten rounds. A good default for circuits.",
            TimerConfig::new(10, 30, 30, 10),
        ),
        builtin(
            "emom-10",
            "EMOM 10",
            "strength",
            indoc::indoc! {"
                Every minute on the minute for ten minutes. Finish the set
                early and the rest of the minute is your recovery.
            "},
            TimerConfig::new(10, 60, 0, 10),
        ),
        builtin(
            "boxing",
            "Boxing Rounds",
            "combat",
            "Twelve three-minute rounds with one minute between them.",
            TimerConfig::new(15, 180, 60, 12),
        ),
        builtin(
            "beginner",
            "Beginner Intervals",
            "beginner",
            "Short efforts with generous rest for building a base.",
            TimerConfig::new(15, 20, 40, 6),
        ),
        builtin(
            "quick-start",
            "Quick Start",
            "other",
            "A single ten-second countdown, no rounds.",
            TimerConfig::new(10, 1, 0, 0),
        ),
    ]
}

fn builtin(id: &str, name: &str, category: &str, description: &str, config: TimerConfig) -> Preset {
    Preset {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        description: description.trim().to_string(),
        config,
        builtin: true,
    }
}

/// Find a built-in preset by id.
pub fn find_builtin(id: &str) -> Option<Preset> {
    builtin_presets().into_iter().find(|p| p.id == id)
}

/// Partial preset edit.
#[derive(Debug, Clone, Default)]
pub struct PresetPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub config: TimerConfigPatch,
}

pub struct PresetCatalog<'a> {
    settings: Settings<'a>,
}

impl<'a> PresetCatalog<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self {
            settings: Settings::new(store),
        }
    }

    /// Built-ins followed by user presets.
    pub fn all(&self) -> Vec<Preset> {
        let mut presets = builtin_presets();
        presets.extend(self.user_presets());
        presets
    }

    pub fn user_presets(&self) -> Vec<Preset> {
        self.settings
            .load::<UserPresets>()
            .0
            .into_iter()
            .map(|mut p| {
                p.builtin = false;
                p
            })
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<Preset> {
        self.all().into_iter().find(|p| p.id == id)
    }

    pub fn require(&self, id: &str) -> Result<Preset> {
        self.find(id)
            .ok_or_else(|| ValidationError::PresetNotFound(id.to_string()).into())
    }

    /// Add a user preset. Returns it with its generated id.
    pub fn add(
        &self,
        name: &str,
        category: &str,
        description: &str,
        config: TimerConfig,
    ) -> Result<Preset> {
        if name.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "name".into(),
                message: "must not be empty".into(),
            }
            .into());
        }
        let preset = Preset {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            category: category.to_string(),
            description: description.to_string(),
            config: config.clamped(),
            builtin: false,
        };
        let mut user = self.user_presets();
        user.push(preset.clone());
        self.settings.save(&UserPresets(user))?;
        info!(id = %preset.id, name = %preset.name, "preset added");
        Ok(preset)
    }

    pub fn update(&self, id: &str, patch: &PresetPatch) -> Result<Preset> {
        let mut user = self.user_presets();
        let preset = match user.iter_mut().find(|p| p.id == id) {
            Some(p) => p,
            None => return Err(self.missing_or_builtin(id)),
        };
        if let Some(name) = &patch.name {
            preset.name = name.clone();
        }
        if let Some(category) = &patch.category {
            preset.category = category.clone();
        }
        if let Some(description) = &patch.description {
            preset.description = description.clone();
        }
        preset.config = preset.config.merged(&patch.config).clamped();
        let updated = preset.clone();
        self.settings.save(&UserPresets(user))?;
        Ok(updated)
    }

    /// Remove a user preset, clearing the active selection if it pointed there.
    pub fn remove(&self, id: &str) -> Result<()> {
        let mut user = self.user_presets();
        let before = user.len();
        user.retain(|p| p.id != id);
        if user.len() == before {
            return Err(self.missing_or_builtin(id));
        }
        self.settings.save(&UserPresets(user))?;
        if self.active_id().as_deref() == Some(id) {
            self.clear_active()?;
        }
        info!(id, "preset removed");
        Ok(())
    }

    pub fn active_id(&self) -> Option<String> {
        self.settings.load::<ActiveProfileId>().0
    }

    /// The selected preset, if it still exists.
    pub fn active(&self) -> Option<Preset> {
        self.active_id().and_then(|id| self.find(&id))
    }

    pub fn set_active(&self, id: &str) -> Result<Preset> {
        let preset = self.require(id)?;
        self.settings
            .save(&ActiveProfileId(Some(preset.id.clone())))?;
        Ok(preset)
    }

    pub fn clear_active(&self) -> Result<()> {
        self.settings.reset(StorageKey::ActiveProfileId)
    }

    fn missing_or_builtin(&self, id: &str) -> crate::error::CoreError {
        if find_builtin(id).is_some() {
            ValidationError::BuiltinPreset(id.to_string()).into()
        } else {
            ValidationError::PresetNotFound(id.to_string()).into()
        }
    }
}
