//! Notifier sinks: sound, vibration and speech cues.
//!
//! Each sink runs on its own task, reading the driver's event stream and
//! turning the events it cares about into [`Cue`]s for an output backend.
//! Sinks never touch the sequencer, so a slow speech engine cannot delay a
//! tick.

mod sound;
mod speech;
mod vibration;

pub use sound::SoundNotifier;
pub use speech::SpeechNotifier;
pub use vibration::VibrationNotifier;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{trace, warn};

use crate::events::Event;
use crate::i18n::Language;
use crate::storage::{AppPreferences, GeneralSettings, Settings, SoundSettings, SpeechSettings};
use crate::timer::{Phase, TickDriver};

/// Abstract notification tag derived from an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueEvent {
    PreparationStart,
    RoundStart,
    RestStart,
    Countdown,
    Halfway,
    Paused,
    Resumed,
    WorkoutComplete,
    WorkoutStopped,
}

/// Context that accompanies a [`CueEvent`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CueMeta {
    pub round: u32,
    /// Zero when the source event does not carry it.
    pub total_rounds: u32,
    pub remaining_secs: u32,
}

impl CueEvent {
    /// Map a driver event to a cue tag. Ticks and bookkeeping events map
    /// to `None`.
    pub fn from_event(event: &Event) -> Option<(CueEvent, CueMeta)> {
        match *event {
            Event::PhaseChanged {
                to,
                round,
                total_rounds,
                duration_secs,
                ..
            } => {
                let tag = match to {
                    Phase::Preparation => CueEvent::PreparationStart,
                    Phase::Exercise => CueEvent::RoundStart,
                    Phase::Rest => CueEvent::RestStart,
                    // WorkoutCompleted follows immediately and carries the cue.
                    Phase::Completed => return None,
                };
                Some((
                    tag,
                    CueMeta {
                        round,
                        total_rounds,
                        remaining_secs: duration_secs,
                    },
                ))
            }
            Event::Countdown {
                round,
                remaining_secs,
                ..
            } => Some((
                CueEvent::Countdown,
                CueMeta {
                    round,
                    total_rounds: 0,
                    remaining_secs,
                },
            )),
            Event::Halfway {
                round,
                remaining_secs,
            } => Some((
                CueEvent::Halfway,
                CueMeta {
                    round,
                    total_rounds: 0,
                    remaining_secs,
                },
            )),
            Event::Paused { remaining_secs, .. } => Some((
                CueEvent::Paused,
                CueMeta {
                    remaining_secs,
                    ..Default::default()
                },
            )),
            Event::Resumed { remaining_secs, .. } => Some((
                CueEvent::Resumed,
                CueMeta {
                    remaining_secs,
                    ..Default::default()
                },
            )),
            Event::WorkoutCompleted { rounds, .. } => Some((
                CueEvent::WorkoutComplete,
                CueMeta {
                    round: rounds,
                    total_rounds: rounds,
                    remaining_secs: 0,
                },
            )),
            Event::WorkoutStopped {
                completed_rounds, ..
            } => Some((
                CueEvent::WorkoutStopped,
                CueMeta {
                    round: completed_rounds,
                    ..Default::default()
                },
            )),
            Event::WorkoutStarted { .. } | Event::Tick { .. } => None,
        }
    }
}

/// A rendered notification, ready for an output backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cue {
    Sound {
        event: CueEvent,
        sound: String,
        volume: u8,
    },
    Vibrate {
        /// Alternating on/off durations, starting with on.
        pattern_ms: Vec<u64>,
    },
    Speak {
        text: String,
        language: Language,
        rate: f32,
        pitch: f32,
    },
}

/// Turns cue tags into cues according to its own settings.
pub trait Notifier: Send {
    fn name(&self) -> &'static str;

    fn notify(&mut self, event: CueEvent, meta: &CueMeta) -> Option<Cue>;
}

/// Where cues are rendered: a speaker, a motor, a terminal, a test buffer.
pub trait CueOutput: Send {
    fn emit(&mut self, cue: &Cue);
}

/// Settings every sink draws from, loaded once per run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CueSettings {
    pub language: Language,
    pub sound: SoundSettings,
    pub speech: SpeechSettings,
    pub preferences: AppPreferences,
}

impl CueSettings {
    pub fn load(settings: &Settings<'_>) -> Self {
        Self {
            language: settings.load::<GeneralSettings>().language,
            sound: settings.load::<SoundSettings>(),
            speech: settings.load::<SpeechSettings>(),
            preferences: settings.load::<AppPreferences>(),
        }
    }
}

/// Run `notifier` against `events` until the run ends or the channel closes.
///
/// A lagging receiver logs the gap and carries on with the events still
/// buffered.
pub fn spawn_notifier<N>(
    mut notifier: N,
    mut events: broadcast::Receiver<Event>,
    mut output: Box<dyn CueOutput>,
) -> JoinHandle<()>
where
    N: Notifier + 'static,
{
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some((tag, meta)) = CueEvent::from_event(&event) {
                        if let Some(cue) = notifier.notify(tag, &meta) {
                            trace!(sink = notifier.name(), event = event.kind(), ?tag, "cue");
                            output.emit(&cue);
                        }
                    }
                    if event.is_final() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(sink = notifier.name(), skipped, "notifier lagging, events dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// Spawn the sound, vibration and speech sinks for `driver`.
///
/// `make_output` is called once per sink.
pub fn spawn_notifiers(
    settings: &CueSettings,
    driver: &TickDriver,
    mut make_output: impl FnMut() -> Box<dyn CueOutput>,
) -> Vec<JoinHandle<()>> {
    vec![
        spawn_notifier(
            SoundNotifier::new(settings.sound.clone()),
            driver.subscribe(),
            make_output(),
        ),
        spawn_notifier(
            VibrationNotifier::new(settings.preferences.clone()),
            driver.subscribe(),
            make_output(),
        ),
        spawn_notifier(
            SpeechNotifier::new(settings.speech.clone(), settings.language),
            driver.subscribe(),
            make_output(),
        ),
    ]
}

/// Output that collects cues in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingOutput {
    cues: std::sync::Arc<std::sync::Mutex<Vec<Cue>>>,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cues(&self) -> Vec<Cue> {
        self.cues.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl CueOutput for RecordingOutput {
    fn emit(&mut self, cue: &Cue) {
        if let Ok(mut cues) = self.cues.lock() {
            cues.push(cue.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{TickRate, TimerConfig};
    use tokio::sync::mpsc;

    #[test]
    fn completed_phase_change_has_no_cue() {
        let event = Event::PhaseChanged {
            from: Some(Phase::Exercise),
            to: Phase::Completed,
            round: 1,
            total_rounds: 1,
            duration_secs: 0,
            elapsed: 10,
        };
        assert!(CueEvent::from_event(&event).is_none());
    }

    #[test]
    fn exercise_maps_to_round_start() {
        let event = Event::PhaseChanged {
            from: Some(Phase::Rest),
            to: Phase::Exercise,
            round: 3,
            total_rounds: 8,
            duration_secs: 20,
            elapsed: 70,
        };
        let (tag, meta) = CueEvent::from_event(&event).unwrap();
        assert_eq!(tag, CueEvent::RoundStart);
        assert_eq!(meta.round, 3);
        assert_eq!(meta.total_rounds, 8);
    }

    fn round_start(round: u32) -> Event {
        Event::PhaseChanged {
            from: Some(Phase::Rest),
            to: Phase::Exercise,
            round,
            total_rounds: 5,
            duration_secs: 20,
            elapsed: u64::from(round) * 30,
        }
    }

    fn sound_rounds(cues: &[Cue]) -> usize {
        cues.iter()
            .filter(|c| matches!(c, Cue::Sound { event: CueEvent::RoundStart, .. }))
            .count()
    }

    #[tokio::test]
    async fn lagging_sink_keeps_going() {
        let (tx, rx) = broadcast::channel(2);
        for round in 1..=5 {
            tx.send(round_start(round)).unwrap();
        }
        drop(tx);

        let output = RecordingOutput::new();
        let handle = spawn_notifier(
            SoundNotifier::new(SoundSettings::default()),
            rx,
            Box::new(output.clone()),
        );
        handle.await.unwrap();

        // The three oldest events were overwritten; the two buffered ones still sound.
        assert_eq!(sound_rounds(&output.cues()), 2);
    }

    #[tokio::test]
    async fn sink_stops_after_final_event() {
        let (tx, rx) = broadcast::channel(8);
        let output = RecordingOutput::new();
        let handle = spawn_notifier(
            SoundNotifier::new(SoundSettings::default()),
            rx,
            Box::new(output.clone()),
        );
        tx.send(round_start(1)).unwrap();
        tx.send(Event::WorkoutStopped {
            phase: Phase::Exercise,
            completed_rounds: 0,
            elapsed: 40,
        })
        .unwrap();

        // Sender still alive: the sink must end on its own.
        handle.await.unwrap();
        let cues = output.cues();
        assert_eq!(sound_rounds(&cues), 1);
        assert!(matches!(
            cues.last(),
            Some(Cue::Sound { event: CueEvent::WorkoutStopped, .. })
        ));
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn sinks_receive_the_whole_run() {
        let driver = TickDriver::new(TimerConfig::new(3, 5, 2, 2), TickRate::Preview);
        let output = RecordingOutput::new();
        let settings = CueSettings {
            speech: SpeechSettings {
                enabled: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let recorder = output.clone();
        let handles = spawn_notifiers(&settings, &driver, || Box::new(recorder.clone()));

        let (_tx, ctl) = mpsc::channel(1);
        driver.run(ctl).await;
        for handle in handles {
            handle.await.unwrap();
        }

        let cues = output.cues();
        assert_eq!(sound_rounds(&cues), 2);
        assert!(cues.iter().any(|c| matches!(
            c,
            Cue::Speak { text, .. } if text == "Workout complete. Great job"
        )));
        assert!(cues.iter().any(|c| matches!(c, Cue::Vibrate { .. })));
    }
}
