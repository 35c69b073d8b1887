//! # Intervalo Core Library
//!
//! Core logic for the Intervalo interval-training timer. Everything the CLI
//! does is available here; the binary is a thin layer over the same types.
//!
//! ## Architecture
//!
//! - **Timer**: a tick-counting phase sequencer (preparation, exercise,
//!   rest, completed) and an async driver that feeds it at real-time or
//!   10x preview rate
//! - **Notify**: sound, vibration and speech sinks that each consume the
//!   driver's event stream on their own task
//! - **Storage**: JSON settings blobs in a SQLite key-value table, the
//!   preset catalog, capped workout history and a TOML application config
//!
//! ## Key Components
//!
//! - [`PhaseSequencer`]: pure state machine, one call per elapsed second
//! - [`TickDriver`]: drives a sequencer and publishes [`Event`]s
//! - [`WorkoutSession`]: one run from start to history entry
//! - [`Settings`]: typed access to persisted blobs

pub mod error;
pub mod events;
pub mod i18n;
pub mod notify;
pub mod session;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, Result, StorageError, ValidationError};
pub use events::Event;
pub use i18n::Language;
pub use notify::{Cue, CueEvent, CueOutput, CueSettings, Notifier};
pub use session::{SessionOutcome, WorkoutSession};
pub use storage::{Config, HistoryStore, KeyValueStore, PresetCatalog, Settings, SqliteStore};
pub use timer::{Control, Phase, PhaseSequencer, RunState, RunSummary, TickDriver, TickRate, TimerConfig};
