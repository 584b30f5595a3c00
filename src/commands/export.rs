use clap::Args;
use std::error::Error;
use std::path::PathBuf;

use gain::{Config, Store, WorkoutRecord};

use super::{open_store, WORKOUTS};

/// Write the CSV projection of the workout collection.
///
/// Header row plus one row per set. This is a one-way, read-only view; the
/// JSON documents stay authoritative.
#[derive(Args)]
pub struct ExportCommand {
    /// Destination CSV file
    pub output: PathBuf,
}

impl ExportCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn Error>> {
        let store: Store<WorkoutRecord> = open_store(config, WORKOUTS).await;
        let workouts = store.all();

        let mut writer = csv::Writer::from_path(&self.output)
            .map_err(|e| format!("Failed to open {}: {}", self.output.display(), e))?;

        writer.write_record([
            "workout_id",
            "started_at",
            "exercise",
            "set",
            "reps",
            "weight_kg",
            "note",
        ])?;

        let mut rows = 0usize;
        for workout in &workouts {
            for exercise in &workout.exercises {
                for (i, set) in exercise.sets.iter().enumerate() {
                    writer.write_record([
                        workout.id.to_string(),
                        workout.started_at.to_rfc3339(),
                        exercise.name.clone(),
                        (i + 1).to_string(),
                        set.reps.to_string(),
                        format!("{}", set.weight_kg),
                        set.note.clone().unwrap_or_default(),
                    ])?;
                    rows += 1;
                }
            }
        }
        writer.flush()?;

        println!(
            "Exported {} workout(s), {} set(s) to {}",
            workouts.len(),
            rows,
            self.output.display()
        );
        Ok(())
    }
}
