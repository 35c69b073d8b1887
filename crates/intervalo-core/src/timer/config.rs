use serde::{Deserialize, Serialize};

use super::phase::Phase;

/// Longest phase accepted from user input, in seconds.
pub const MAX_PHASE_SECS: u32 = 60 * 60;
/// Largest round count accepted from user input.
pub const MAX_ROUNDS: u32 = 99;

/// Durations (seconds) and round count of one interval workout.
///
/// `rounds == 0` is the quick-start case: the workout is only the
/// preparation countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerConfig {
    #[serde(default = "default_prep_time")]
    pub prep_time: u32,
    #[serde(default = "default_exercise_time")]
    pub exercise_time: u32,
    #[serde(default = "default_rest_time")]
    pub rest_time: u32,
    #[serde(default = "default_rounds")]
    pub rounds: u32,
}

fn default_prep_time() -> u32 {
    10
}
fn default_exercise_time() -> u32 {
    20
}
fn default_rest_time() -> u32 {
    10
}
fn default_rounds() -> u32 {
    8
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            prep_time: default_prep_time(),
            exercise_time: default_exercise_time(),
            rest_time: default_rest_time(),
            rounds: default_rounds(),
        }
    }
}

impl TimerConfig {
    pub fn new(prep_time: u32, exercise_time: u32, rest_time: u32, rounds: u32) -> Self {
        Self {
            prep_time,
            exercise_time,
            rest_time,
            rounds,
        }
    }

    /// Clamp every field into its accepted range.
    ///
    /// Exercise time is raised to at least one second; the sequencer relies
    /// on this and never sees a zero-length exercise phase.
    pub fn clamped(self) -> Self {
        Self {
            prep_time: self.prep_time.min(MAX_PHASE_SECS),
            exercise_time: self.exercise_time.clamp(1, MAX_PHASE_SECS),
            rest_time: self.rest_time.min(MAX_PHASE_SECS),
            rounds: self.rounds.min(MAX_ROUNDS),
        }
    }

    pub fn is_quick_start(&self) -> bool {
        self.rounds == 0
    }

    /// Full duration of `phase` in seconds.
    pub fn phase_duration(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Preparation => self.prep_time,
            Phase::Exercise => self.exercise_time,
            Phase::Rest => self.rest_time,
            Phase::Completed => 0,
        }
    }

    /// Number of ticks from start to `Completed`.
    ///
    /// Uses saturating arithmetic so absurd unclamped values cannot overflow.
    pub fn total_duration(&self) -> u64 {
        let prep = u64::from(self.prep_time);
        if self.rounds == 0 {
            return prep;
        }
        let rounds = u64::from(self.rounds);
        let exercise = rounds.saturating_mul(u64::from(self.exercise_time));
        let rest = (rounds - 1).saturating_mul(u64::from(self.rest_time));
        prep.saturating_add(exercise).saturating_add(rest)
    }

    /// Apply a partial update on top of this config.
    pub fn merged(self, patch: &TimerConfigPatch) -> Self {
        Self {
            prep_time: patch.prep_time.unwrap_or(self.prep_time),
            exercise_time: patch.exercise_time.unwrap_or(self.exercise_time),
            rest_time: patch.rest_time.unwrap_or(self.rest_time),
            rounds: patch.rounds.unwrap_or(self.rounds),
        }
    }
}

/// Partial timer config; unset fields keep their previous value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounds: Option<u32>,
}

impl TimerConfigPatch {
    pub fn is_empty(&self) -> bool {
        self.prep_time.is_none()
            && self.exercise_time.is_none()
            && self.rest_time.is_none()
            && self.rounds.is_none()
    }
}
