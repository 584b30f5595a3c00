//! GAIN core library
//!
//! Local-first record store for a personal fitness tracker: versioned
//! collections held in memory, persisted asynchronously with debounced
//! writes, and reconciled across devices with a revision-based merge.

pub mod config;
pub mod models;
pub mod storage;
pub mod store;

pub use config::{Config, ConfigError, SyncConfig};
pub use models::{
    Exercise, ExerciseSet, Metric, MetricValue, Record, SessionStatus, WeightEntry, WorkoutRecord,
    WorkoutSession, WorkoutTotals,
};
pub use storage::{FileStorage, RemoteStorage, StorageAdapter, StorageError};
pub use store::{
    merge_records, SessionError, SessionTracker, Store, Transition, DEFAULT_DEBOUNCE_WINDOW,
};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
