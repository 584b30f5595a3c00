use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::record::Record;

/// A single body-weight measurement.
///
/// Displayed newest-first; storage order is plain insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub id: Uuid,
    pub revision: u64,
    pub device_id: String,
    pub recorded_at: DateTime<Utc>,
    pub weight_kg: f64,
}

impl WeightEntry {
    pub fn new(weight_kg: f64, device_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            revision: 1,
            device_id: device_id.into(),
            recorded_at: Utc::now(),
            weight_kg,
        }
    }

    pub fn with_recorded_at(mut self, recorded_at: DateTime<Utc>) -> Self {
        self.recorded_at = recorded_at;
        self
    }
}

impl Record for WeightEntry {
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

impl fmt::Display for WeightEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {:.1} kg",
            self.recorded_at.format("%Y-%m-%d %H:%M"),
            self.weight_kg
        )
    }
}
