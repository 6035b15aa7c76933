use clap::Subcommand;
use quitloop_core::{Config, EventLog, LogSummary};

use super::open_log;

#[derive(Subcommand)]
pub enum LogAction {
    /// List saved urge sessions
    List {
        /// Print the raw entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Summarize saved urge sessions
    Summary,
}

pub fn run(action: LogAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let log = open_log(&config)?;
    let entries = log.read_all();

    match action {
        LogAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("No urge sessions saved yet.");
            } else {
                for entry in &entries {
                    let intensity = entry
                        .intensity
                        .map(|i| i.to_string())
                        .unwrap_or_else(|| "-".into());
                    println!(
                        "{}  intensity {:>2}  {}",
                        entry.timestamp.format("%Y-%m-%d %H:%M"),
                        intensity,
                        entry.action
                    );
                }
            }
        }
        LogAction::Summary => {
            let summary = LogSummary::from_entries(&entries);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
