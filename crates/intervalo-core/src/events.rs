use serde::{Deserialize, Serialize};

use crate::timer::{Phase, TimerConfig};

/// Every observable change of a running workout produces an Event.
///
/// Events are indexed by elapsed ticks rather than wall-clock time, so a
/// preview run and a real-time run of the same config emit identical
/// sequences. The UI layer renders `Tick`; notifier sinks react to the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    WorkoutStarted {
        config: TimerConfig,
        total_secs: u64,
    },
    /// A new phase began. `from` is `None` for the first phase of a run.
    PhaseChanged {
        from: Option<Phase>,
        to: Phase,
        round: u32,
        total_rounds: u32,
        duration_secs: u32,
        elapsed: u64,
    },
    /// One tick was consumed; carries the post-tick state.
    Tick {
        phase: Phase,
        round: u32,
        remaining_secs: u32,
        elapsed: u64,
    },
    /// Three seconds or less left in the current phase.
    Countdown {
        phase: Phase,
        round: u32,
        remaining_secs: u32,
    },
    /// Midpoint of a long exercise phase.
    Halfway {
        round: u32,
        remaining_secs: u32,
    },
    Paused {
        phase: Phase,
        remaining_secs: u32,
    },
    Resumed {
        phase: Phase,
        remaining_secs: u32,
    },
    WorkoutCompleted {
        rounds: u32,
        elapsed: u64,
    },
    /// User abort; never preceded by a transition to `Completed`.
    WorkoutStopped {
        phase: Phase,
        completed_rounds: u32,
        elapsed: u64,
    },
}

impl Event {
    /// Stable tag used in logs and by sinks that only care about the kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::WorkoutStarted { .. } => "workout_started",
            Event::PhaseChanged { .. } => "phase_changed",
            Event::Tick { .. } => "tick",
            Event::Countdown { .. } => "countdown",
            Event::Halfway { .. } => "halfway",
            Event::Paused { .. } => "paused",
            Event::Resumed { .. } => "resumed",
            Event::WorkoutCompleted { .. } => "workout_completed",
            Event::WorkoutStopped { .. } => "workout_stopped",
        }
    }

    /// True once the run is over, naturally or not.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            Event::WorkoutCompleted { .. } | Event::WorkoutStopped { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_json_shape() {
        let event = Event::Countdown {
            phase: Phase::Rest,
            round: 2,
            remaining_secs: 3,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "countdown");
        assert_eq!(json["phase"], "rest");
        assert_eq!(json["remaining_secs"], 3);
    }

    #[test]
    fn final_events() {
        assert!(Event::WorkoutCompleted { rounds: 1, elapsed: 5 }.is_final());
        assert!(!Event::Halfway { round: 1, remaining_secs: 15 }.is_final());
    }
}
