//! Integration tests for a full workout.
//!
//! Runs sessions against a SQLite database in a temp dir and checks what
//! the notifier sinks heard and what history recorded.

use std::time::Duration;

use intervalo_core::notify::RecordingOutput;
use intervalo_core::storage::{
    HistoryStore, PresetCatalog, Settings, SoundSettings, SpeechSettings, SqliteStore, StorageKey,
    WorkoutType,
};
use intervalo_core::{
    Control, Cue, CueEvent, CueSettings, Language, TickRate, TimerConfig, WorkoutSession,
};
use tokio::sync::mpsc;

fn open(dir: &tempfile::TempDir) -> SqliteStore {
    SqliteStore::open(&dir.path().join("intervalo.db")).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_full_workout_with_cues_and_history() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir);
    let settings = Settings::new(&store);
    settings
        .update::<SpeechSettings>(|s| {
            s.enabled = true;
            s.announce_countdown = true;
        })
        .unwrap();
    settings
        .set_path(StorageKey::Settings, "language", "es")
        .unwrap();

    let cues = CueSettings::load(&settings);
    assert_eq!(cues.language, Language::Es);

    let output = RecordingOutput::new();
    let recorder = output.clone();
    let mut session =
        WorkoutSession::new(TimerConfig::new(3, 4, 2, 2), TickRate::Preview).record_history(true);
    session.attach_notifiers(&cues, || Box::new(recorder.clone()));

    let (_tx, ctl) = mpsc::channel(1);
    let history = HistoryStore::new(&store);
    let outcome = session.run(ctl, Some(&history)).await;

    assert_eq!(outcome.summary.elapsed_secs, 13);
    assert_eq!(outcome.summary.completed_rounds, 2);

    let spoken: Vec<String> = output
        .cues()
        .into_iter()
        .filter_map(|c| match c {
            Cue::Speak { text, .. } => Some(text),
            _ => None,
        })
        .collect();
    assert_eq!(spoken.first().map(String::as_str), Some("Prepárate"));
    assert!(spoken.contains(&"Última ronda".to_string()));
    assert!(spoken.contains(&"3".to_string()));
    assert_eq!(
        spoken.last().map(String::as_str),
        Some("Entrenamiento completado. Buen trabajo")
    );

    // Reopen the database: the entry survived.
    drop(history);
    drop(settings);
    drop(store);
    let store = open(&dir);
    let entries = HistoryStore::new(&store).list();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].workout_type, WorkoutType::Manual);
    assert_eq!(entries[0].duration, 13);
}

#[tokio::test(start_paused = true)]
async fn test_stopped_active_preset_run() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir);
    let catalog = PresetCatalog::new(&store);
    let preset = catalog.set_active("hiit-30-30").unwrap();

    let output = RecordingOutput::new();
    let recorder = output.clone();
    let cues = CueSettings {
        sound: SoundSettings::default(),
        ..Default::default()
    };
    let mut session = WorkoutSession::from_preset(preset, TickRate::Preview).record_history(true);
    session.attach_notifiers(&cues, || Box::new(recorder.clone()));

    let (tx, ctl) = mpsc::channel(4);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1_050)).await;
        tx.send(Control::Pause).await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        tx.send(Control::Stop).await.unwrap();
    });

    let history = HistoryStore::new(&store);
    let outcome = session.run(ctl, Some(&history)).await;

    assert!(outcome.summary.was_interrupted);
    assert_eq!(outcome.summary.elapsed_secs, 10);
    let entry = outcome.entry.unwrap();
    assert_eq!(entry.workout_type, WorkoutType::Preset);
    assert!(entry.was_interrupted);

    let stopped_sound = output.cues().iter().any(|c| {
        matches!(
            c,
            Cue::Sound {
                event: CueEvent::WorkoutStopped,
                ..
            }
        )
    });
    assert!(stopped_sound);
    assert_eq!(history.stats().interrupted_workouts, 1);
}
