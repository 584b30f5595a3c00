mod metric;
mod record;
mod session;
mod weight;
mod workout;

pub use metric::{Metric, MetricValue};
pub use record::Record;
pub use session::{SessionStatus, WorkoutSession};
pub use weight::WeightEntry;
pub use workout::{Exercise, ExerciseSet, WorkoutRecord, WorkoutTotals};
