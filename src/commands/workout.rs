use clap::{Args, Subcommand};
use std::error::Error;
use uuid::Uuid;

use gain::{Config, Exercise, ExerciseSet, Store, WorkoutRecord};

use super::{open_store, OutputFormat, WORKOUTS};

#[derive(Args)]
pub struct WorkoutCommand {
    #[command(subcommand)]
    pub command: WorkoutSubcommand,
}

#[derive(Subcommand)]
pub enum WorkoutSubcommand {
    /// Log a workout
    Add {
        /// Exercise spec, repeatable: "NAME:REPSxWEIGHT,REPSxWEIGHT,..."
        /// e.g. --exercise "Bench Press:8x80,6x85"
        #[arg(long = "exercise", value_name = "SPEC", required = true)]
        exercises: Vec<String>,

        /// Complete the workout immediately, storing its totals
        #[arg(long)]
        complete: bool,
    },

    /// List workouts, most recent first
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show one workout
    Show {
        /// Workout ID
        id: Uuid,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Complete a workout, computing and storing its totals
    Complete {
        /// Workout ID
        id: Uuid,
    },

    /// Delete a workout
    Delete {
        /// Workout ID
        id: Uuid,
    },
}

impl WorkoutCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn Error>> {
        let store: Store<WorkoutRecord> = open_store(config, WORKOUTS).await;

        match &self.command {
            WorkoutSubcommand::Add {
                exercises,
                complete,
            } => {
                let mut workout = WorkoutRecord::new(&config.device_id);
                for spec in exercises {
                    workout = workout.with_exercise(parse_exercise_spec(spec)?);
                }
                if *complete {
                    workout.complete();
                }
                let id = workout.id;
                store.add(workout);
                println!("Logged workout {}", id);
            }
            WorkoutSubcommand::List { format } => match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&store.all())?);
                }
                OutputFormat::Text => {
                    let workouts = store.all();
                    if workouts.is_empty() {
                        println!("No workouts logged yet");
                    }
                    for workout in workouts {
                        print!("{}", workout);
                    }
                }
            },
            WorkoutSubcommand::Show { id, format } => match store.get(*id) {
                Some(workout) => match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&workout)?);
                    }
                    OutputFormat::Text => print!("{}", workout),
                },
                None => println!("No workout with id {}", id),
            },
            WorkoutSubcommand::Complete { id } => match store.get(*id) {
                Some(mut workout) => {
                    if workout.complete() {
                        store.update(workout);
                        println!("Completed workout {}", id);
                    } else {
                        println!("Workout {} is already completed", id);
                    }
                }
                None => println!("No workout with id {}", id),
            },
            WorkoutSubcommand::Delete { id } => {
                if store.delete(*id) {
                    println!("Deleted workout {}", id);
                } else {
                    println!("No workout with id {}", id);
                }
            }
        }

        store.flush().await;
        Ok(())
    }
}

/// Parses an exercise spec of the form "NAME:REPSxWEIGHT,REPSxWEIGHT,...".
fn parse_exercise_spec(spec: &str) -> Result<Exercise, String> {
    let (name, sets_part) = spec
        .split_once(':')
        .ok_or_else(|| format!("Invalid exercise spec '{}': expected NAME:SETS", spec))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("Invalid exercise spec '{}': empty name", spec));
    }

    let mut exercise = Exercise::new(name);
    for set_spec in sets_part.split(',') {
        let (reps, weight) = set_spec.trim().split_once('x').ok_or_else(|| {
            format!("Invalid set '{}': expected REPSxWEIGHT", set_spec.trim())
        })?;
        let reps: u32 = reps
            .trim()
            .parse()
            .map_err(|_| format!("Invalid rep count '{}'", reps.trim()))?;
        let weight_kg: f64 = weight
            .trim()
            .parse()
            .map_err(|_| format!("Invalid weight '{}'", weight.trim()))?;
        exercise.sets.push(ExerciseSet {
            reps,
            weight_kg,
            note: None,
        });
    }

    if exercise.sets.is_empty() {
        return Err(format!("Invalid exercise spec '{}': no sets", spec));
    }

    Ok(exercise)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exercise_spec() {
        let exercise = parse_exercise_spec("Bench Press:8x80,6x85.5").unwrap();

        assert_eq!(exercise.name, "Bench Press");
        assert_eq!(exercise.sets.len(), 2);
        assert_eq!(exercise.sets[0].reps, 8);
        assert_eq!(exercise.sets[1].weight_kg, 85.5);
    }

    #[test]
    fn test_parse_exercise_spec_trims_whitespace() {
        let exercise = parse_exercise_spec("Squat: 5x120 , 5x125").unwrap();

        assert_eq!(exercise.name, "Squat");
        assert_eq!(exercise.sets[1].weight_kg, 125.0);
    }

    #[test]
    fn test_parse_exercise_spec_rejects_bad_input() {
        assert!(parse_exercise_spec("no-sets-here").is_err());
        assert!(parse_exercise_spec(":8x80").is_err());
        assert!(parse_exercise_spec("Bench:eightx80").is_err());
        assert!(parse_exercise_spec("Bench:8x").is_err());
        assert!(parse_exercise_spec("Bench:").is_err());
    }
}
