use clap::{CommandFactory, Parser, Subcommand};
use intervalo_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "intervalo", version, about = "Interval training timer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a workout
    Run(commands::run::RunArgs),
    /// Timer configuration and application config file
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Persisted settings blobs
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Workout presets
    Preset {
        #[command(subcommand)]
        action: commands::preset::PresetAction,
    },
    /// Workout history
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

/// RUST_LOG wins, then `log.filter` from config.toml.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(Config::load_or_default().log.filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::Settings { action } => commands::settings::run(action),
        Commands::Preset { action } => commands::preset::run(action),
        Commands::History { action } => commands::history::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "intervalo", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
