mod config_cmd;
mod export;
mod session;
mod sync_cmd;
mod weight;
mod workout;

pub use config_cmd::ConfigCommand;
pub use export::ExportCommand;
pub use session::SessionCommand;
pub use sync_cmd::MergeCommand;
pub use weight::WeightCommand;
pub use workout::WorkoutCommand;

use clap::ValueEnum;
use serde::de::DeserializeOwned;
use serde::Serialize;

use gain::{storage, Config, Record, Store};

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Opens the store for a named collection against the configured backend.
pub(crate) async fn open_store<T>(config: &Config, name: &str) -> Store<T>
where
    T: Record + Serialize + DeserializeOwned,
{
    let adapter = storage::for_collection(config, name);
    Store::open(adapter, config.debounce_window()).await
}

pub(crate) const WORKOUTS: &str = "workouts";
pub(crate) const WEIGHTS: &str = "weights";
pub(crate) const SESSIONS: &str = "sessions";
