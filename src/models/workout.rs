use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::record::Record;

/// A logged strength workout: an ordered list of exercises, each with an
/// ordered list of sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub id: Uuid,
    pub revision: u64,
    pub device_id: String,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    pub exercises: Vec<Exercise>,
    /// Aggregates computed once at completion and stored verbatim, so
    /// historical records stay stable even if the aggregation logic changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<WorkoutTotals>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    pub sets: Vec<ExerciseSet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSet {
    pub reps: u32,
    pub weight_kg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutTotals {
    pub sets: u32,
    pub reps: u32,
    /// Σ reps × weight over every set, in kg.
    pub volume_kg: f64,
}

impl WorkoutRecord {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            revision: 1,
            device_id: device_id.into(),
            started_at: Utc::now(),
            ended_at: None,
            exercises: Vec::new(),
            totals: None,
        }
    }

    pub fn with_exercise(mut self, exercise: Exercise) -> Self {
        self.exercises.push(exercise);
        self
    }

    pub fn with_started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = started_at;
        self
    }

    /// Marks an accepted payload mutation: bumps the revision by one.
    ///
    /// Callers that edit `exercises` in place call this before handing the
    /// record back to the store.
    pub fn touch(&mut self) {
        self.revision += 1;
    }

    /// Completes the workout: sets `ended_at`, computes and stores the
    /// aggregate totals, and bumps the revision.
    ///
    /// Returns false (leaving the record unchanged) if already completed.
    pub fn complete(&mut self) -> bool {
        if self.ended_at.is_some() {
            return false;
        }
        self.ended_at = Some(Utc::now());
        self.totals = Some(self.compute_totals());
        self.revision += 1;
        true
    }

    fn compute_totals(&self) -> WorkoutTotals {
        let mut totals = WorkoutTotals {
            sets: 0,
            reps: 0,
            volume_kg: 0.0,
        };
        for exercise in &self.exercises {
            for set in &exercise.sets {
                totals.sets += 1;
                totals.reps += set.reps;
                totals.volume_kg += f64::from(set.reps) * set.weight_kg;
            }
        }
        totals
    }
}

impl Record for WorkoutRecord {
    fn id(&self) -> Uuid {
        self.id
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn device_id(&self) -> &str {
        &self.device_id
    }
}

impl Exercise {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sets: Vec::new(),
        }
    }

    pub fn with_set(mut self, reps: u32, weight_kg: f64) -> Self {
        self.sets.push(ExerciseSet {
            reps,
            weight_kg,
            note: None,
        });
        self
    }
}

impl fmt::Display for WorkoutRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Workout {} ({})",
            self.started_at.format("%Y-%m-%d %H:%M"),
            self.id
        )?;
        for exercise in &self.exercises {
            writeln!(f, "  {}", exercise.name)?;
            for (i, set) in exercise.sets.iter().enumerate() {
                write!(f, "    set {}: {} x {:.1} kg", i + 1, set.reps, set.weight_kg)?;
                if let Some(note) = &set.note {
                    write!(f, " ({})", note)?;
                }
                writeln!(f)?;
            }
        }
        if let Some(totals) = &self.totals {
            writeln!(
                f,
                "  total: {} sets, {} reps, {:.1} kg volume",
                totals.sets, totals.reps, totals.volume_kg
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bench_and_squat() -> WorkoutRecord {
        WorkoutRecord::new("phone-a")
            .with_exercise(Exercise::new("Bench Press").with_set(8, 80.0).with_set(6, 85.0))
            .with_exercise(Exercise::new("Squat").with_set(5, 120.0))
    }

    #[test]
    fn test_workout_new_starts_at_revision_one() {
        let workout = WorkoutRecord::new("phone-a");

        assert_eq!(workout.revision, 1);
        assert!(workout.ended_at.is_none());
        assert!(workout.totals.is_none());
    }

    #[test]
    fn test_complete_stores_totals_and_bumps_revision() {
        let mut workout = bench_and_squat();

        assert!(workout.complete());

        assert_eq!(workout.revision, 2);
        assert!(workout.ended_at.is_some());
        let totals = workout.totals.unwrap();
        assert_eq!(totals.sets, 3);
        assert_eq!(totals.reps, 19);
        assert!((totals.volume_kg - (8.0 * 80.0 + 6.0 * 85.0 + 5.0 * 120.0)).abs() < 1e-9);
    }

    #[test]
    fn test_complete_twice_is_a_noop() {
        let mut workout = bench_and_squat();
        assert!(workout.complete());
        let revision = workout.revision;
        let ended_at = workout.ended_at;

        assert!(!workout.complete());

        assert_eq!(workout.revision, revision);
        assert_eq!(workout.ended_at, ended_at);
    }

    #[test]
    fn test_stored_totals_survive_payload_edits() {
        let mut workout = bench_and_squat();
        workout.complete();
        let totals = workout.totals.clone();

        // Editing the payload afterwards must not change the stored snapshot
        workout.exercises.push(Exercise::new("Deadlift").with_set(3, 140.0));
        workout.touch();

        assert_eq!(workout.totals, totals);
        assert_eq!(workout.revision, 3);
    }

    #[test]
    fn test_workout_json_roundtrip() {
        let mut workout = bench_and_squat();
        workout.complete();

        let json = serde_json::to_string(&workout).unwrap();
        let parsed: WorkoutRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, workout);
    }
}
