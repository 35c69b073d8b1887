//! Async tick source for the phase sequencer.
//!
//! One driver serves both real-time runs and the 10x preview; the only
//! difference is the interval period. Events are published on a
//! `broadcast` channel so each notifier sink can consume them on its own
//! task.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::config::TimerConfig;
use super::sequencer::{PhaseSequencer, RunSummary};
use crate::events::Event;

/// Capacity of the event channel. A slow sink that falls further behind
/// than this sees `Lagged` and skips ahead.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickRate {
    /// One tick per wall-clock second.
    #[default]
    RealTime,
    /// One tick per 100ms, for previewing a workout's shape.
    Preview,
}

impl TickRate {
    pub const PREVIEW_SPEEDUP: u32 = 10;

    pub fn period(self) -> Duration {
        match self {
            TickRate::RealTime => Duration::from_secs(1),
            TickRate::Preview => Duration::from_secs(1) / Self::PREVIEW_SPEEDUP,
        }
    }
}

/// User commands delivered to a running driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Pause,
    Resume,
    TogglePause,
    Stop,
}

pub struct TickDriver {
    sequencer: PhaseSequencer,
    rate: TickRate,
    events: broadcast::Sender<Event>,
}

impl TickDriver {
    pub fn new(config: TimerConfig, rate: TickRate) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            sequencer: PhaseSequencer::new(config),
            rate,
            events,
        }
    }

    /// Subscribe before calling [`run`](Self::run); events published
    /// earlier are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    pub fn sequencer(&self) -> &PhaseSequencer {
        &self.sequencer
    }

    pub fn rate(&self) -> TickRate {
        self.rate
    }

    /// Drive the sequencer until it completes or a `Control::Stop` arrives.
    ///
    /// Dropping every `control` sender does not stop the run; it simply
    /// continues to completion. The event channel closes when this returns.
    pub async fn run(mut self, mut control: mpsc::Receiver<Control>) -> RunSummary {
        let mut interval = tokio::time::interval(self.rate.period());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of a tokio interval completes immediately.
        interval.tick().await;

        info!(
            rate = ?self.rate,
            total_secs = self.sequencer.config().total_duration(),
            "workout started"
        );
        let opening = self.sequencer.start();
        self.publish_all(opening);

        while !self.sequencer.is_finished() {
            tokio::select! {
                biased;
                Some(cmd) = control.recv() => {
                    debug!(?cmd, "control received");
                    match cmd {
                        Control::Pause => {
                            let event = self.sequencer.pause();
                            self.publish_opt(event);
                        }
                        Control::Resume | Control::TogglePause => {
                            let event = if cmd == Control::Resume {
                                self.sequencer.resume()
                            } else {
                                self.sequencer.toggle_pause()
                            };
                            if matches!(event, Some(Event::Resumed { .. })) {
                                // A resumed phase gets a full period before its next tick.
                                interval.reset();
                            }
                            self.publish_opt(event);
                        }
                        Control::Stop => {
                            let event = self.sequencer.stop();
                            self.publish_opt(event);
                        }
                    }
                }
                _ = interval.tick() => {
                    let events = self.sequencer.tick();
                    self.publish_all(events);
                }
            }
        }

        let summary = self.sequencer.summary();
        info!(
            elapsed_secs = summary.elapsed_secs,
            completed_rounds = summary.completed_rounds,
            interrupted = summary.was_interrupted,
            remaining_secs = self.sequencer.remaining_total(),
            "workout finished"
        );
        summary
    }

    fn publish_all(&self, events: Vec<Event>) {
        for event in events {
            // No subscribers is not an error; the run proceeds unobserved.
            let _ = self.events.send(event);
        }
    }

    fn publish_opt(&self, event: Option<Event>) {
        if let Some(event) = event {
            let _ = self.events.send(event);
        }
    }
}
