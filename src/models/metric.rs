use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single metric sample taken during a live session.
///
/// The well-known channels (heart rate, power, cadence, elapsed time) are
/// first-class optional fields; anything else a sensor wants to attach goes
/// into the `extra` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub recorded_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cadence: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, MetricValue>,
}

impl Metric {
    pub fn new() -> Self {
        Self {
            recorded_at: Utc::now(),
            heart_rate: None,
            power: None,
            cadence: None,
            elapsed_seconds: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_heart_rate(mut self, bpm: u32) -> Self {
        self.heart_rate = Some(bpm);
        self
    }

    pub fn with_power(mut self, watts: u32) -> Self {
        self.power = Some(watts);
        self
    }

    pub fn with_cadence(mut self, rpm: u32) -> Self {
        self.cadence = Some(rpm);
        self
    }

    pub fn with_elapsed_seconds(mut self, seconds: u64) -> Self {
        self.elapsed_seconds = Some(seconds);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: MetricValue) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

impl Default for Metric {
    fn default() -> Self {
        Self::new()
    }
}

/// An extensible metric payload value.
///
/// Sum type over the shapes a sensor payload can take. Serialized untagged so
/// the persisted document stays plain JSON and round-trips without any
/// runtime type inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<MetricValue>),
    Map(BTreeMap<String, MetricValue>),
}

impl From<bool> for MetricValue {
    fn from(v: bool) -> Self {
        MetricValue::Bool(v)
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Number(v)
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::Number(v as f64)
    }
}

impl From<&str> for MetricValue {
    fn from(v: &str) -> Self {
        MetricValue::Text(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_builder() {
        let metric = Metric::new()
            .with_heart_rate(152)
            .with_power(240)
            .with_extra("zone", MetricValue::from(4i64));

        assert_eq!(metric.heart_rate, Some(152));
        assert_eq!(metric.power, Some(240));
        assert_eq!(metric.cadence, None);
        assert_eq!(metric.extra.get("zone"), Some(&MetricValue::Number(4.0)));
    }

    #[test]
    fn test_metric_json_roundtrip() {
        let metric = Metric::new()
            .with_heart_rate(140)
            .with_elapsed_seconds(95)
            .with_extra("indoor", MetricValue::from(true))
            .with_extra(
                "splits",
                MetricValue::List(vec![MetricValue::Number(31.5), MetricValue::Number(30.8)]),
            );

        let json = serde_json::to_string(&metric).unwrap();
        let parsed: Metric = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, metric);
    }

    #[test]
    fn test_metric_value_nested_map_roundtrip() {
        let mut inner = BTreeMap::new();
        inner.insert("lat".to_string(), MetricValue::Number(45.5));
        inner.insert("lon".to_string(), MetricValue::Number(-73.6));
        let value = MetricValue::Map(inner);

        let json = serde_json::to_string(&value).unwrap();
        let parsed: MetricValue = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, value);
    }

    #[test]
    fn test_metric_skips_empty_fields() {
        let json = serde_json::to_string(&Metric::new()).unwrap();
        assert!(!json.contains("heart_rate"));
        assert!(!json.contains("extra"));
    }
}
