use clap::{Args, Subcommand};
use std::error::Error;
use uuid::Uuid;

use gain::{Config, Store, WeightEntry};

use super::{open_store, OutputFormat, WEIGHTS};

#[derive(Args)]
pub struct WeightCommand {
    #[command(subcommand)]
    pub command: WeightSubcommand,
}

#[derive(Subcommand)]
pub enum WeightSubcommand {
    /// Log a body-weight measurement
    Add {
        /// Weight in kilograms
        weight_kg: f64,
    },

    /// List measurements, newest first
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Show at most this many entries
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Delete a measurement
    Delete {
        /// Entry ID
        id: Uuid,
    },
}

impl WeightCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn Error>> {
        let store: Store<WeightEntry> = open_store(config, WEIGHTS).await;

        match &self.command {
            WeightSubcommand::Add { weight_kg } => {
                let entry = WeightEntry::new(*weight_kg, &config.device_id);
                let id = entry.id;
                store.add(entry);
                println!("Logged {:.1} kg ({})", weight_kg, id);
            }
            WeightSubcommand::List { format, limit } => {
                // display order is newest first; storage order is untouched
                let mut entries = store.all();
                entries.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
                if let Some(limit) = limit {
                    entries.truncate(*limit);
                }
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&entries)?);
                    }
                    OutputFormat::Text => {
                        if entries.is_empty() {
                            println!("No weight entries yet");
                        }
                        for entry in entries {
                            println!("{}  ({})", entry, entry.id);
                        }
                    }
                }
            }
            WeightSubcommand::Delete { id } => {
                if store.delete(*id) {
                    println!("Deleted entry {}", id);
                } else {
                    println!("No entry with id {}", id);
                }
            }
        }

        store.flush().await;
        Ok(())
    }
}
