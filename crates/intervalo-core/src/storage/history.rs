//! Workout history: a capped, newest-first list of finished runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::kv::KeyValueStore;
use super::presets::Preset;
use super::settings::{Setting, Settings, StorageKey};
use crate::error::{Result, ValidationError};
use crate::timer::{RunSummary, TimerConfig};

/// Entries kept; older ones are dropped on append.
pub const MAX_HISTORY_ENTRIES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutType {
    Preset,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutHistoryEntry {
    pub id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub date: DateTime<Utc>,
    /// Seconds actually trained.
    pub duration: u64,
    #[serde(rename = "type")]
    pub workout_type: WorkoutType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset_category: Option<String>,
    pub config: TimerConfig,
    pub completed_rounds: u32,
    pub total_rounds: u32,
    pub was_interrupted: bool,
}

impl WorkoutHistoryEntry {
    /// Build an entry for a run that ended at `ended_at`.
    pub fn from_run(
        config: TimerConfig,
        preset: Option<&Preset>,
        summary: &RunSummary,
        ended_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: ended_at.timestamp_millis(),
            date: ended_at,
            duration: summary.elapsed_secs,
            workout_type: if preset.is_some() {
                WorkoutType::Preset
            } else {
                WorkoutType::Manual
            },
            preset_name: preset.map(|p| p.name.clone()),
            preset_category: preset.map(|p| p.category.clone()),
            config,
            completed_rounds: summary.completed_rounds,
            total_rounds: summary.total_rounds,
            was_interrupted: summary.was_interrupted,
        }
    }
}

/// Persisted list under `workout_history`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutHistory(pub Vec<WorkoutHistoryEntry>);

impl Setting for WorkoutHistory {
    const KEY: StorageKey = StorageKey::WorkoutHistory;
}

/// Aggregates over the stored history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total_workouts: usize,
    pub completed_workouts: usize,
    pub interrupted_workouts: usize,
    pub total_secs: u64,
    pub total_rounds: u64,
    pub last_workout: Option<DateTime<Utc>>,
}

pub struct HistoryStore<'a> {
    settings: Settings<'a>,
}

impl<'a> HistoryStore<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self {
            settings: Settings::new(store),
        }
    }

    /// All entries, newest first.
    pub fn list(&self) -> Vec<WorkoutHistoryEntry> {
        let mut entries = self.settings.load::<WorkoutHistory>().0;
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries
    }

    pub fn get(&self, id: &str) -> Option<WorkoutHistoryEntry> {
        self.list().into_iter().find(|e| e.id == id)
    }

    /// Prepend `entry`, keeping at most [`MAX_HISTORY_ENTRIES`].
    pub fn append(&self, entry: WorkoutHistoryEntry) -> Result<()> {
        let mut entries = self.list();
        debug!(id = %entry.id, interrupted = entry.was_interrupted, "history append");
        entries.insert(0, entry);
        entries.truncate(MAX_HISTORY_ENTRIES);
        self.settings.save(&WorkoutHistory(entries))
    }

    pub fn remove(&self, id: &str) -> Result<()> {
        let mut entries = self.list();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            return Err(ValidationError::HistoryEntryNotFound(id.to_string()).into());
        }
        self.settings.save(&WorkoutHistory(entries))
    }

    pub fn clear(&self) -> Result<()> {
        self.settings.reset(StorageKey::WorkoutHistory)
    }

    pub fn stats(&self) -> HistoryStats {
        let entries = self.list();
        let completed = entries.iter().filter(|e| !e.was_interrupted).count();
        HistoryStats {
            total_workouts: entries.len(),
            completed_workouts: completed,
            interrupted_workouts: entries.len() - completed,
            total_secs: entries.iter().map(|e| e.duration).sum(),
            total_rounds: entries.iter().map(|e| u64::from(e.completed_rounds)).sum(),
            last_workout: entries.first().map(|e| e.date),
        }
    }
}
