//! Workout phase sequencer.
//!
//! A tick-driven state machine. It owns no clock - the caller feeds one
//! `tick()` per simulated second (see [`super::driver`]).
//!
//! ## State Transitions
//!
//! ```text
//! Preparation -> Exercise -> (Rest -> Exercise)* -> Completed
//! Preparation -> Completed                  (rounds == 0)
//! ```
//!
//! Zero-length preparation or rest phases are passed through on the same
//! tick boundary, so the run always takes exactly
//! [`TimerConfig::total_duration`] ticks.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::TimerConfig;
use super::phase::Phase;
use crate::events::Event;

/// Exercise phases at least this long get a halfway cue.
pub const HALFWAY_MIN_SECS: u32 = 30;
/// The last this-many seconds of a phase emit countdown events.
pub const COUNTDOWN_SECS: u32 = 3;

/// Ephemeral state of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    pub phase: Phase,
    pub current_round: u32,
    pub time_remaining: u32,
    pub total_phase_time: u32,
    pub is_running: bool,
    pub is_paused: bool,
}

/// What the caller needs once a run ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub elapsed_secs: u64,
    pub completed_rounds: u32,
    pub total_rounds: u32,
    pub was_interrupted: bool,
}

#[derive(Debug, Clone)]
pub struct PhaseSequencer {
    config: TimerConfig,
    state: RunState,
    elapsed: u64,
    completed_rounds: u32,
    stopped: bool,
}

impl PhaseSequencer {
    /// Create a sequencer in its initial `Preparation` state.
    pub fn new(config: TimerConfig) -> Self {
        Self {
            config,
            state: RunState {
                phase: Phase::Preparation,
                current_round: 1,
                time_remaining: config.prep_time,
                total_phase_time: config.prep_time,
                is_running: false,
                is_paused: false,
            },
            elapsed: 0,
            completed_rounds: 0,
            stopped: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    pub fn completed_rounds(&self) -> u32 {
        self.completed_rounds
    }

    /// Ticks left until `Completed`.
    pub fn remaining_total(&self) -> u64 {
        self.config.total_duration().saturating_sub(self.elapsed)
    }

    /// Completed or stopped; no further ticks are consumed.
    pub fn is_finished(&self) -> bool {
        self.stopped || self.state.phase.is_terminal()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            elapsed_secs: self.elapsed,
            completed_rounds: self.completed_rounds,
            total_rounds: self.config.rounds,
            was_interrupted: self.stopped,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin the run. Returns the opening events; empty if already started.
    pub fn start(&mut self) -> Vec<Event> {
        if self.state.is_running || self.is_finished() {
            return Vec::new();
        }
        self.state.is_running = true;
        let mut events = vec![Event::WorkoutStarted {
            config: self.config,
            total_secs: self.config.total_duration(),
        }];
        if self.state.time_remaining == 0 {
            self.advance(None, &mut events);
        } else {
            events.push(self.phase_changed(None));
        }
        events
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.state.is_running || self.state.is_paused || self.is_finished() {
            return None;
        }
        self.state.is_paused = true;
        Some(Event::Paused {
            phase: self.state.phase,
            remaining_secs: self.state.time_remaining,
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if !self.state.is_paused || self.is_finished() {
            return None;
        }
        self.state.is_paused = false;
        Some(Event::Resumed {
            phase: self.state.phase,
            remaining_secs: self.state.time_remaining,
        })
    }

    pub fn toggle_pause(&mut self) -> Option<Event> {
        if self.state.is_paused {
            self.resume()
        } else {
            self.pause()
        }
    }

    /// Abort the run. Does not pass through `Completed`.
    ///
    /// Returns `None` when the run already ended.
    pub fn stop(&mut self) -> Option<Event> {
        if self.is_finished() {
            return None;
        }
        self.stopped = true;
        self.state.is_running = false;
        self.state.is_paused = false;
        Some(Event::WorkoutStopped {
            phase: self.state.phase,
            completed_rounds: self.completed_rounds,
            elapsed: self.elapsed,
        })
    }

    /// Consume one tick. Ignored while paused, before `start()` or after
    /// the run has ended.
    pub fn tick(&mut self) -> Vec<Event> {
        if !self.state.is_running || self.state.is_paused || self.is_finished() {
            return Vec::new();
        }
        let mut events = Vec::new();
        self.state.time_remaining = self.state.time_remaining.saturating_sub(1);
        self.elapsed += 1;

        if self.state.time_remaining == 0 {
            self.advance(Some(self.state.phase), &mut events);
        } else {
            let remaining = self.state.time_remaining;
            if remaining <= COUNTDOWN_SECS {
                events.push(Event::Countdown {
                    phase: self.state.phase,
                    round: self.state.current_round,
                    remaining_secs: remaining,
                });
            }
            if self.is_halfway() {
                events.push(Event::Halfway {
                    round: self.state.current_round,
                    remaining_secs: remaining,
                });
            }
        }

        if !self.is_finished() {
            events.push(Event::Tick {
                phase: self.state.phase,
                round: self.state.current_round,
                remaining_secs: self.state.time_remaining,
                elapsed: self.elapsed,
            });
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn is_halfway(&self) -> bool {
        self.state.phase == Phase::Exercise
            && self.config.exercise_time >= HALFWAY_MIN_SECS
            && self.state.time_remaining == self.config.exercise_time / 2
    }

    /// Leave the current (exhausted) phase, passing through any
    /// zero-length phases, and report the phase finally entered.
    fn advance(&mut self, from: Option<Phase>, events: &mut Vec<Event>) {
        loop {
            let next = match self.state.phase {
                Phase::Preparation if self.config.rounds == 0 => Phase::Completed,
                Phase::Preparation => Phase::Exercise,
                Phase::Exercise => {
                    self.completed_rounds += 1;
                    if self.state.current_round < self.config.rounds {
                        Phase::Rest
                    } else {
                        Phase::Completed
                    }
                }
                Phase::Rest => {
                    self.state.current_round += 1;
                    Phase::Exercise
                }
                Phase::Completed => return,
            };
            let duration = self.config.phase_duration(next);
            self.state.phase = next;
            self.state.time_remaining = duration;
            self.state.total_phase_time = duration;
            if next.is_terminal() || duration > 0 {
                break;
            }
        }

        debug!(
            from = ?from,
            to = %self.state.phase,
            round = self.state.current_round,
            elapsed = self.elapsed,
            "phase transition"
        );
        events.push(self.phase_changed(from));

        if self.state.phase.is_terminal() {
            self.state.is_running = false;
            events.push(Event::WorkoutCompleted {
                rounds: self.completed_rounds,
                elapsed: self.elapsed,
            });
        }
    }

    fn phase_changed(&self, from: Option<Phase>) -> Event {
        Event::PhaseChanged {
            from,
            to: self.state.phase,
            round: self.state.current_round,
            total_rounds: self.config.rounds,
            duration_secs: self.state.total_phase_time,
            elapsed: self.elapsed,
        }
    }
}
