//! Preset catalog commands.
//!
//! Built-in presets are read-only; user presets live in the settings
//! database and can be edited or removed.

use clap::Subcommand;
use intervalo_core::storage::{Preset, PresetCatalog, PresetPatch};
use intervalo_core::timer::TimerConfigPatch;
use intervalo_core::TimerConfig;

use super::{format_secs, open_store, CmdResult};

#[derive(Subcommand)]
pub enum PresetAction {
    /// List built-in and user presets
    List {
        #[arg(long)]
        json: bool,
    },

    /// Show details for a preset
    Show {
        /// Preset id (e.g. "tabata", "emom-10")
        id: String,
    },

    /// Create a user preset
    Add {
        name: String,
        #[arg(long, default_value = "custom")]
        category: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        prep: Option<u32>,
        #[arg(long)]
        exercise: Option<u32>,
        #[arg(long)]
        rest: Option<u32>,
        #[arg(long)]
        rounds: Option<u32>,
    },

    /// Edit a user preset
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        prep: Option<u32>,
        #[arg(long)]
        exercise: Option<u32>,
        #[arg(long)]
        rest: Option<u32>,
        #[arg(long)]
        rounds: Option<u32>,
    },

    /// Delete a user preset
    Remove { id: String },

    /// Make a preset the default for `run`
    Activate { id: String },

    /// Clear the active preset
    Deactivate,

    /// Show the active preset
    Active,
}

pub fn run(action: PresetAction) -> CmdResult {
    let store = open_store()?;
    let catalog = PresetCatalog::new(&store);

    match action {
        PresetAction::List { json } => list(&catalog, json),
        PresetAction::Show { id } => {
            let preset = catalog.require(&id)?;
            show(&preset);
            Ok(())
        }
        PresetAction::Add {
            name,
            category,
            description,
            prep,
            exercise,
            rest,
            rounds,
        } => {
            let patch = TimerConfigPatch {
                prep_time: prep,
                exercise_time: exercise,
                rest_time: rest,
                rounds,
            };
            let config = TimerConfig::default().merged(&patch);
            let preset = catalog.add(&name, &category, &description, config)?;
            println!("Preset created: {}", preset.id);
            Ok(())
        }
        PresetAction::Edit {
            id,
            name,
            category,
            description,
            prep,
            exercise,
            rest,
            rounds,
        } => {
            let patch = PresetPatch {
                name,
                category,
                description,
                config: TimerConfigPatch {
                    prep_time: prep,
                    exercise_time: exercise,
                    rest_time: rest,
                    rounds,
                },
            };
            let preset = catalog.update(&id, &patch)?;
            show(&preset);
            Ok(())
        }
        PresetAction::Remove { id } => {
            catalog.remove(&id)?;
            println!("Preset removed: {id}");
            Ok(())
        }
        PresetAction::Activate { id } => {
            let preset = catalog.set_active(&id)?;
            println!("Active preset: {} ({})", preset.name, preset.id);
            Ok(())
        }
        PresetAction::Deactivate => {
            catalog.clear_active()?;
            println!("No active preset");
            Ok(())
        }
        PresetAction::Active => {
            match catalog.active() {
                Some(preset) => show(&preset),
                None => println!("No active preset"),
            }
            Ok(())
        }
    }
}

fn list(catalog: &PresetCatalog<'_>, json: bool) -> CmdResult {
    let presets = catalog.all();
    if json {
        println!("{}", serde_json::to_string_pretty(&presets)?);
        return Ok(());
    }

    let active = catalog.active_id();
    for preset in presets {
        let marker = if active.as_deref() == Some(preset.id.as_str()) {
            " [ACTIVE]"
        } else {
            ""
        };
        let origin = if preset.builtin { "built-in" } else { "user" };
        println!(
            "  {:<14} {} ({}, {}){}",
            preset.id,
            preset.name,
            preset.category,
            origin,
            marker
        );
    }
    Ok(())
}

fn show(preset: &Preset) {
    let title = format!("{} ({})", preset.name, preset.id);
    println!("{title}");
    println!("{}", "=".repeat(title.chars().count()));
    println!("Category: {}", preset.category);
    if !preset.description.trim().is_empty() {
        println!();
        for line in preset.description.lines() {
            println!("  {line}");
        }
    }
    println!();
    let c = &preset.config;
    println!("  Preparation: {}s", c.prep_time);
    println!("  Exercise:    {}s", c.exercise_time);
    println!("  Rest:        {}s", c.rest_time);
    println!("  Rounds:      {}", c.rounds);
    println!("  Total:       {}", format_secs(c.total_duration()));
}
