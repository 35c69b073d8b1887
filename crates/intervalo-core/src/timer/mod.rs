mod config;
mod driver;
mod phase;
mod sequencer;

pub use config::{TimerConfig, TimerConfigPatch, MAX_PHASE_SECS, MAX_ROUNDS};
pub use driver::{Control, TickDriver, TickRate, EVENT_CHANNEL_CAPACITY};
pub use phase::Phase;
pub use sequencer::{PhaseSequencer, RunState, RunSummary, COUNTDOWN_SECS, HALFWAY_MIN_SECS};

#[cfg(test)]
mod proptests;
