//! One workout from start to history entry.

use chrono::Utc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::events::Event;
use crate::notify::{spawn_notifiers, CueOutput, CueSettings};
use crate::storage::{HistoryStore, Preset, WorkoutHistoryEntry};
use crate::timer::{Control, RunSummary, TickDriver, TickRate, TimerConfig};

/// Result of [`WorkoutSession::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    pub summary: RunSummary,
    /// The entry written to history, if any.
    pub entry: Option<WorkoutHistoryEntry>,
}

pub struct WorkoutSession {
    config: TimerConfig,
    preset: Option<Preset>,
    driver: TickDriver,
    sinks: Vec<JoinHandle<()>>,
    record_history: bool,
}

impl WorkoutSession {
    /// A session for `config`, clamped to the supported ranges.
    ///
    /// Real-time sessions are recorded to history by default; previews are not.
    pub fn new(config: TimerConfig, rate: TickRate) -> Self {
        let config = config.clamped();
        Self {
            config,
            preset: None,
            driver: TickDriver::new(config, rate),
            sinks: Vec::new(),
            record_history: rate == TickRate::RealTime,
        }
    }

    pub fn from_preset(preset: Preset, rate: TickRate) -> Self {
        let mut session = Self::new(preset.config, rate);
        session.preset = Some(preset);
        session
    }

    pub fn record_history(mut self, record: bool) -> Self {
        self.record_history = record;
        self
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn preset(&self) -> Option<&Preset> {
        self.preset.as_ref()
    }

    pub fn rate(&self) -> TickRate {
        self.driver.rate()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.driver.subscribe()
    }

    /// Attach the sound, vibration and speech sinks.
    pub fn attach_notifiers(
        &mut self,
        settings: &CueSettings,
        make_output: impl FnMut() -> Box<dyn CueOutput>,
    ) {
        let handles = spawn_notifiers(settings, &self.driver, make_output);
        self.sinks.extend(handles);
    }

    /// Run to completion or until `Control::Stop`, then wait for the sinks
    /// to drain and append the run to `history`.
    ///
    /// A run that never advanced the clock is not recorded. History write
    /// failures are logged; the outcome still reports the summary.
    pub async fn run(
        self,
        control: mpsc::Receiver<Control>,
        history: Option<&HistoryStore<'_>>,
    ) -> SessionOutcome {
        let WorkoutSession {
            config,
            preset,
            driver,
            sinks,
            record_history,
        } = self;

        let summary = driver.run(control).await;
        for sink in sinks {
            if let Err(e) = sink.await {
                warn!(error = %e, "notifier task failed");
            }
        }

        let entry = match history {
            Some(store) if record_history && summary.elapsed_secs > 0 => {
                let entry =
                    WorkoutHistoryEntry::from_run(config, preset.as_ref(), &summary, Utc::now());
                match store.append(entry.clone()) {
                    Ok(()) => {
                        info!(id = %entry.id, "workout recorded");
                        Some(entry)
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to record workout history");
                        None
                    }
                }
            }
            _ => None,
        };

        SessionOutcome { summary, entry }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, Result, StorageError};
    use crate::notify::RecordingOutput;
    use crate::storage::{find_builtin, KeyValueStore, MemoryStore, WorkoutType};

    /// Store that refuses every write.
    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key)
        }
        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(CoreError::Storage(StorageError::Locked))
        }
        fn remove(&self, key: &str) -> Result<()> {
            self.0.remove(key)
        }
        fn keys(&self) -> Result<Vec<String>> {
            self.0.keys()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn completed_run_is_recorded() {
        let store = MemoryStore::new();
        let history = HistoryStore::new(&store);
        let session = WorkoutSession::new(TimerConfig::new(2, 3, 1, 2), TickRate::Preview)
            .record_history(true);
        let (_tx, ctl) = mpsc::channel(1);

        let outcome = session.run(ctl, Some(&history)).await;

        assert_eq!(outcome.summary.elapsed_secs, 9);
        let entry = outcome.entry.unwrap();
        assert_eq!(entry.workout_type, WorkoutType::Manual);
        assert_eq!(entry.completed_rounds, 2);
        assert!(!entry.was_interrupted);
        assert_eq!(history.list(), vec![entry]);
    }

    #[tokio::test(start_paused = true)]
    async fn preview_is_not_recorded_by_default() {
        let store = MemoryStore::new();
        let history = HistoryStore::new(&store);
        let session = WorkoutSession::new(TimerConfig::new(0, 2, 0, 1), TickRate::Preview);
        let (_tx, ctl) = mpsc::channel(1);

        let outcome = session.run(ctl, Some(&history)).await;

        assert!(outcome.entry.is_none());
        assert!(history.list().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_preset_run_is_interrupted() {
        let store = MemoryStore::new();
        let history = HistoryStore::new(&store);
        let tabata = find_builtin("tabata").unwrap();
        let session = WorkoutSession::from_preset(tabata, TickRate::Preview).record_history(true);
        let (tx, ctl) = mpsc::channel(1);

        let stopper = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(2_550)).await;
            tx.send(Control::Stop).await.unwrap();
        });
        let outcome = session.run(ctl, Some(&history)).await;
        stopper.await.unwrap();

        let entry = outcome.entry.unwrap();
        assert!(entry.was_interrupted);
        assert_eq!(entry.workout_type, WorkoutType::Preset);
        assert_eq!(entry.preset_name.as_deref(), Some("Tabata"));
        assert_eq!(entry.duration, 25);
        assert_eq!(entry.completed_rounds, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn history_failure_does_not_fail_the_run() {
        let store = ReadOnlyStore(MemoryStore::new());
        let history = HistoryStore::new(&store);
        let mut session = WorkoutSession::new(TimerConfig::new(0, 2, 0, 1), TickRate::Preview)
            .record_history(true);
        let output = RecordingOutput::new();
        let recorder = output.clone();
        session.attach_notifiers(&CueSettings::default(), || Box::new(recorder.clone()));
        let (_tx, ctl) = mpsc::channel(1);

        let outcome = session.run(ctl, Some(&history)).await;

        assert_eq!(outcome.summary.completed_rounds, 1);
        assert!(outcome.entry.is_none());
        assert!(!output.cues().is_empty());
    }
}
