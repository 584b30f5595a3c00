use clap::{Args, ValueEnum};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::error::Error;
use std::path::PathBuf;
use uuid::Uuid;

use gain::{Config, Record, Store, WeightEntry, WorkoutRecord, WorkoutSession};

use super::{open_store, SESSIONS, WEIGHTS, WORKOUTS};

#[derive(Clone, ValueEnum)]
pub enum CollectionKind {
    Workouts,
    Weights,
    Sessions,
}

/// Merge a peer device's exported collection document into the local store.
#[derive(Args)]
pub struct MergeCommand {
    /// Path to the peer's JSON document
    pub file: PathBuf,

    /// Which collection the document holds
    #[arg(long, value_enum, default_value = "workouts")]
    pub kind: CollectionKind,
}

impl MergeCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn Error>> {
        let contents = std::fs::read_to_string(&self.file)
            .map_err(|e| format!("Failed to read {}: {}", self.file.display(), e))?;

        let (added, updated) = match self.kind {
            CollectionKind::Workouts => {
                merge_into::<WorkoutRecord>(config, WORKOUTS, &contents).await?
            }
            CollectionKind::Weights => {
                merge_into::<WeightEntry>(config, WEIGHTS, &contents).await?
            }
            CollectionKind::Sessions => {
                merge_into::<WorkoutSession>(config, SESSIONS, &contents).await?
            }
        };

        println!("Merge successful. Added: {}, Updated: {}", added, updated);
        Ok(())
    }
}

async fn merge_into<T>(
    config: &Config,
    name: &str,
    contents: &str,
) -> Result<(usize, usize), Box<dyn Error>>
where
    T: Record + Serialize + DeserializeOwned,
{
    let remote: Vec<T> = serde_json::from_str(contents)
        .map_err(|e| format!("Peer document is not a valid {} collection: {}", name, e))?;

    let store: Store<T> = open_store(config, name).await;

    // remember what we had, so the outcome can be reported
    let before: HashMap<Uuid, (u64, u8)> = store
        .all()
        .iter()
        .map(|r| (r.id(), (r.revision(), r.merge_rank())))
        .collect();

    store.merge_remote(&remote);
    let after = store.all();

    let added = after.len() - before.len();
    let updated = after
        .iter()
        .filter(|r| {
            before
                .get(&r.id())
                .map(|&prev| prev != (r.revision(), r.merge_rank()))
                .unwrap_or(false)
        })
        .count();

    store.flush().await;
    Ok((added, updated))
}
