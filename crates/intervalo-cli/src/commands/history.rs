use clap::Subcommand;
use intervalo_core::storage::{HistoryStore, WorkoutHistoryEntry};

use super::{format_secs, open_store, CmdResult};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List recorded workouts, newest first
    List {
        #[arg(long)]
        json: bool,
        /// Show at most this many entries
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show one entry as JSON
    Show { id: String },
    /// Delete one entry
    Remove { id: String },
    /// Delete all entries
    Clear,
    /// Totals over the stored history
    Stats {
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: HistoryAction) -> CmdResult {
    let store = open_store()?;
    let history = HistoryStore::new(&store);

    match action {
        HistoryAction::List { json, limit } => {
            let mut entries = history.list();
            if let Some(limit) = limit {
                entries.truncate(limit);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("No workouts recorded");
            } else {
                for entry in &entries {
                    println!("{}", summary_line(entry));
                }
            }
        }
        HistoryAction::Show { id } => {
            let entry = history
                .get(&id)
                .ok_or_else(|| format!("history entry not found: {id}"))?;
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
        HistoryAction::Remove { id } => {
            history.remove(&id)?;
            println!("Removed: {id}");
        }
        HistoryAction::Clear => {
            history.clear()?;
            println!("History cleared");
        }
        HistoryAction::Stats { json } => {
            let stats = history.stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Workouts:    {}", stats.total_workouts);
                println!("Completed:   {}", stats.completed_workouts);
                println!("Interrupted: {}", stats.interrupted_workouts);
                println!("Rounds:      {}", stats.total_rounds);
                println!("Time:        {}", format_secs(stats.total_secs));
                if let Some(last) = stats.last_workout {
                    println!("Last:        {}", last.format("%Y-%m-%d %H:%M"));
                }
            }
        }
    }
    Ok(())
}

fn summary_line(entry: &WorkoutHistoryEntry) -> String {
    let name = entry.preset_name.as_deref().unwrap_or("Custom");
    let status = if entry.was_interrupted { " (stopped)" } else { "" };
    format!(
        "{}  {}  {:<16} {}/{} rounds  {}{}",
        entry.id.get(..8).unwrap_or(&entry.id),
        entry.date.format("%Y-%m-%d %H:%M"),
        name,
        entry.completed_rounds,
        entry.total_rounds,
        format_secs(entry.duration),
        status
    )
}
