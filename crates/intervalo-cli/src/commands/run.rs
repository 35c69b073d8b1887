//! `intervalo run`: drive a workout in the terminal.

use std::io::{BufRead, Write};

use clap::Args;
use intervalo_core::storage::{
    AppPreferences, GeneralSettings, HistoryStore, PresetCatalog, Settings, Theme,
};
use intervalo_core::timer::TimerConfigPatch;
use intervalo_core::{Control, Cue, CueOutput, CueSettings, Event, Language, Phase, TickRate, WorkoutSession};
use tokio::sync::{broadcast, mpsc};
use tracing::debug;

use super::{format_secs, open_store, CmdResult};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Preset id (see `preset list`). Defaults to the active preset.
    #[arg(long)]
    pub preset: Option<String>,
    /// Preparation seconds
    #[arg(long)]
    pub prep: Option<u32>,
    /// Exercise seconds per round
    #[arg(long)]
    pub exercise: Option<u32>,
    /// Rest seconds between rounds
    #[arg(long)]
    pub rest: Option<u32>,
    /// Number of rounds
    #[arg(long)]
    pub rounds: Option<u32>,
    /// Run at 10x speed
    #[arg(long)]
    pub preview: bool,
    /// Do not record the run in history
    #[arg(long)]
    pub no_history: bool,
    /// Print events as JSON lines instead of a status line
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    fn overrides(&self) -> TimerConfigPatch {
        TimerConfigPatch {
            prep_time: self.prep,
            exercise_time: self.exercise,
            rest_time: self.rest,
            rounds: self.rounds,
        }
    }
}

/// Pick preset and config: an explicit preset, then the active preset,
/// then the stored timer config. Flag overrides apply on top.
fn build_session(args: &RunArgs, settings: &Settings<'_>, catalog: &PresetCatalog<'_>) -> CmdResult<WorkoutSession> {
    let rate = if args.preview {
        TickRate::Preview
    } else {
        TickRate::RealTime
    };
    let overrides = args.overrides();

    let preset = match &args.preset {
        Some(id) => Some(catalog.require(id)?),
        None if overrides.is_empty() => catalog.active(),
        None => None,
    };

    let session = match preset {
        Some(mut preset) => {
            preset.config = preset.config.merged(&overrides);
            WorkoutSession::from_preset(preset, rate)
        }
        None => WorkoutSession::new(settings.timer_config().merged(&overrides), rate),
    };
    Ok(session.record_history(!args.no_history && !args.preview))
}

pub fn run(args: RunArgs) -> CmdResult {
    let store = open_store()?;
    let settings = Settings::new(&store);
    let catalog = PresetCatalog::new(&store);
    let history = HistoryStore::new(&store);

    let mut session = build_session(&args, &settings, &catalog)?;
    let general = settings.load::<GeneralSettings>();
    let total_secs = settings
        .load::<AppPreferences>()
        .show_total_remaining
        .then(|| session.config().total_duration());
    let cues = CueSettings::load(&settings);
    let config = *session.config();

    // With --json, stdout carries only event lines.
    let mut info: Box<dyn Write> = if args.json {
        Box::new(std::io::stderr())
    } else {
        Box::new(std::io::stdout())
    };
    match session.preset() {
        Some(p) => writeln!(info, "{} ({})", p.name, p.id)?,
        None => writeln!(info, "Custom workout")?,
    }
    writeln!(
        info,
        "prep {}s, exercise {}s, rest {}s, {} rounds, total {}{}",
        config.prep_time,
        config.exercise_time,
        config.rest_time,
        config.rounds,
        format_secs(config.total_duration()),
        if args.preview { " (preview)" } else { "" }
    )?;
    if !args.json {
        writeln!(info, "p + Enter to pause/resume, q + Enter or Ctrl-C to stop")?;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let outcome = runtime.block_on(async move {
        let (control_tx, control_rx) = mpsc::channel(8);

        session.attach_notifiers(&cues, || Box::new(TerminalOutput));
        let renderer = tokio::spawn(render(
            session.subscribe(),
            args.json,
            general.language,
            general.theme,
            config.rounds,
            total_secs,
        ));

        spawn_stdin_reader(control_tx.clone());
        let ctrl_c_tx = control_tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = ctrl_c_tx.send(Control::Stop).await;
            }
        });
        drop(control_tx);

        let outcome = session.run(control_rx, Some(&history)).await;
        if let Err(e) = renderer.await {
            debug!(error = %e, "renderer ended abnormally");
        }
        outcome
    });
    // The stdin thread may still be blocked on a read.
    runtime.shutdown_background();

    let summary = outcome.summary;
    writeln!(info)?;
    if summary.was_interrupted {
        writeln!(
            info,
            "Workout stopped: {}/{} rounds in {}",
            summary.completed_rounds,
            summary.total_rounds,
            format_secs(summary.elapsed_secs)
        )?;
    } else {
        writeln!(
            info,
            "Workout complete: {} rounds in {}",
            summary.completed_rounds,
            format_secs(summary.elapsed_secs)
        )?;
    }
    if let Some(entry) = outcome.entry {
        writeln!(info, "Recorded: {}", entry.id)?;
    }
    Ok(())
}

/// Line commands from stdin. Runs on a plain thread since a blocking read
/// cannot be cancelled.
fn spawn_stdin_reader(tx: mpsc::Sender<Control>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let cmd = match line.trim() {
                "p" | "pause" => Control::TogglePause,
                "q" | "quit" | "stop" => Control::Stop,
                other => {
                    debug!(input = other, "ignored input");
                    continue;
                }
            };
            if tx.blocking_send(cmd).is_err() {
                break;
            }
        }
    });
}

async fn render(
    mut events: broadcast::Receiver<Event>,
    json: bool,
    language: Language,
    theme: Theme,
    total_rounds: u32,
    total_secs: Option<u64>,
) {
    use tokio::sync::broadcast::error::RecvError;

    let mut out = std::io::stdout();
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        };
        if json {
            if let Ok(line) = serde_json::to_string(&event) {
                let _ = writeln!(out, "{line}");
            }
            continue;
        }
        match event {
            Event::Tick {
                phase,
                round,
                remaining_secs,
                elapsed,
            } => {
                let _ = write!(
                    out,
                    "\r\x1b[2K{}{:<10}\x1b[0m round {}/{}  {}",
                    ansi_color(phase.color(theme)),
                    phase.label(language),
                    round,
                    total_rounds,
                    format_secs(u64::from(remaining_secs))
                );
                if let Some(total) = total_secs {
                    let _ = write!(out, "  (total {})", format_secs(total.saturating_sub(elapsed)));
                }
            }
            Event::Paused { .. } => {
                let _ = write!(out, "  [paused]");
            }
            Event::PhaseChanged { to: Phase::Completed, .. } => {}
            Event::PhaseChanged { to, round, .. } => {
                let _ = write!(out, "\r\x1b[2K{} {round}\n", to.label(language));
            }
            _ => {}
        }
        let _ = out.flush();
    }
}

/// `#RRGGBB` to a 24-bit foreground escape.
fn ansi_color(hex: &str) -> String {
    let hex = hex.trim_start_matches('#');
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
            .unwrap_or(255)
    };
    format!("\x1b[38;2;{};{};{}m", channel(0), channel(2), channel(4))
}

/// Bell for sounds, printed speech, vibration only in the log.
struct TerminalOutput;

impl CueOutput for TerminalOutput {
    fn emit(&mut self, cue: &Cue) {
        let mut err = std::io::stderr();
        match cue {
            Cue::Sound { .. } => {
                let _ = write!(err, "\x07");
            }
            Cue::Speak { text, language, .. } => {
                debug!(lang = language.tag(), "speak");
                let _ = writeln!(err, "\n  > {text}");
            }
            Cue::Vibrate { pattern_ms } => debug!(?pattern_ms, "vibrate"),
        }
        let _ = err.flush();
    }
}
