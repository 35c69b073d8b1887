use clap::Subcommand;
use intervalo_core::storage::{json_path, Settings, StorageKey};
use intervalo_core::{Config, TimerConfig};

use super::{format_secs, open_store, CmdResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the timer configuration
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Get one timer field (prep, exercise, rest, rounds)
    Get { key: String },
    /// Set one timer field; values are clamped to the supported range
    Set { key: String, value: String },
    /// Reset the timer configuration to defaults
    Reset,
    /// Application config file (config.toml)
    File {
        #[command(subcommand)]
        action: FileAction,
    },
}

#[derive(Subcommand)]
pub enum FileAction {
    /// Get a config value (e.g. "log.filter")
    Get { key: String },
    /// Set a config value
    Set { key: String, value: String },
    /// Print the whole config
    List,
    /// Reset config.toml to defaults
    Reset,
}

/// Accept short, snake_case and camelCase field names.
fn timer_field(key: &str) -> Option<&'static str> {
    match key {
        "prep" | "prep_time" | "prepTime" => Some("prepTime"),
        "exercise" | "exercise_time" | "exerciseTime" => Some("exerciseTime"),
        "rest" | "rest_time" | "restTime" => Some("restTime"),
        "rounds" => Some("rounds"),
        _ => None,
    }
}

fn print_timer(config: &TimerConfig) {
    println!("prep:     {}s", config.prep_time);
    println!("exercise: {}s", config.exercise_time);
    println!("rest:     {}s", config.rest_time);
    println!("rounds:   {}", config.rounds);
    println!("total:    {}", format_secs(config.total_duration()));
}

pub fn run(action: ConfigAction) -> CmdResult {
    match action {
        ConfigAction::File { action } => run_file(action),
        timer => run_timer(timer),
    }
}

fn run_timer(action: ConfigAction) -> CmdResult {
    let store = open_store()?;
    let settings = Settings::new(&store);
    match action {
        ConfigAction::Show { json } => {
            let config = settings.timer_config();
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print_timer(&config);
            }
        }
        ConfigAction::Get { key } => {
            let field = timer_field(&key).ok_or_else(|| format!("unknown key: {key}"))?;
            let value = settings.get_value(StorageKey::TimerConfig)?;
            let found = json_path::get(&value, field).ok_or_else(|| format!("unknown key: {key}"))?;
            println!("{found}");
        }
        ConfigAction::Set { key, value } => {
            let field = timer_field(&key).ok_or_else(|| format!("unknown key: {key}"))?;
            settings.set_path(StorageKey::TimerConfig, field, &value)?;
            print_timer(&settings.timer_config());
        }
        ConfigAction::Reset => {
            settings.reset(StorageKey::TimerConfig)?;
            print_timer(&settings.timer_config());
        }
        ConfigAction::File { action } => run_file(action)?,
    }
    Ok(())
}

fn run_file(action: FileAction) -> CmdResult {
    match action {
        FileAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key).ok_or_else(|| format!("unknown key: {key}"))?;
            println!("{value}");
        }
        FileAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("ok");
        }
        FileAction::List => {
            let config = Config::load()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        FileAction::Reset => {
            Config::default().save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
