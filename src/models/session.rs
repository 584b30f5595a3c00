use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use super::metric::{Metric, MetricValue};
use super::record::Record;

/// Lifecycle state of a live workout session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Running,
    Paused,
    Ended,
}

impl SessionStatus {
    /// Merge precedence: Running < Paused < Ended. A completed session is a
    /// terminal fact and outranks an in-progress copy of the same revision.
    pub fn precedence(self) -> u8 {
        match self {
            SessionStatus::Running => 0,
            SessionStatus::Paused => 1,
            SessionStatus::Ended => 2,
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Running => write!(f, "running"),
            SessionStatus::Paused => write!(f, "paused"),
            SessionStatus::Ended => write!(f, "ended"),
        }
    }
}

/// A live, time-bounded tracking session.
///
/// Transition methods return whether they applied; an invalid transition
/// leaves the session (and its revision) untouched. Once `Ended` the session
/// is logically immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub id: Uuid,
    pub revision: u64,
    pub device_id: String,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metrics: Vec<Metric>,
    /// Snapshot captured at `end()`, absent before that.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_metrics: Option<BTreeMap<String, MetricValue>>,
}

impl WorkoutSession {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            revision: 1,
            device_id: device_id.into(),
            status: SessionStatus::Running,
            started_at: Utc::now(),
            ended_at: None,
            metrics: Vec::new(),
            final_metrics: None,
        }
    }

    /// Running -> Paused.
    pub fn pause(&mut self) -> bool {
        if self.status != SessionStatus::Running {
            return false;
        }
        self.status = SessionStatus::Paused;
        self.revision += 1;
        true
    }

    /// Paused -> Running.
    pub fn resume(&mut self) -> bool {
        if self.status != SessionStatus::Paused {
            return false;
        }
        self.status = SessionStatus::Running;
        self.revision += 1;
        true
    }

    /// Appends a metric sample. Dropped without error on an `Ended` session;
    /// late samples from a buffered wearable are expected.
    pub fn log_metric(&mut self, metric: Metric) -> bool {
        if self.status == SessionStatus::Ended {
            return false;
        }
        self.metrics.push(metric);
        self.revision += 1;
        true
    }

    /// Running or Paused -> Ended, storing the final metrics snapshot.
    pub fn end(&mut self, final_metrics: Option<BTreeMap<String, MetricValue>>) -> bool {
        if self.status == SessionStatus::Ended {
            return false;
        }
        self.status = SessionStatus::Ended;
        self.ended_at = Some(Utc::now());
        self.final_metrics = final_metrics;
        self.revision += 1;
        true
    }
}

impl Record for WorkoutSession {
    fn id(&self) -> Uuid {
        self.id
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn device_id(&self) -> &str {
        &self.device_id
    }

    fn merge_rank(&self) -> u8 {
        self.status.precedence()
    }
}

impl fmt::Display for WorkoutSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {}  {} metric(s)",
            self.started_at.format("%Y-%m-%d %H:%M"),
            self.status,
            self.metrics.len()
        )?;
        if let Some(ended_at) = self.ended_at {
            write!(f, "  ended {}", ended_at.format("%H:%M"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_running_at_revision_one() {
        let session = WorkoutSession::new("watch-b");

        assert_eq!(session.status, SessionStatus::Running);
        assert_eq!(session.revision, 1);
        assert!(session.ended_at.is_none());
    }

    #[test]
    fn test_start_pause_end_scenario() {
        let mut session = WorkoutSession::new("watch-b");

        assert!(session.pause());
        assert_eq!(session.status, SessionStatus::Paused);
        assert_eq!(session.revision, 2);

        let mut finals = BTreeMap::new();
        finals.insert("duration".to_string(), MetricValue::Number(1800.0));
        assert!(session.end(Some(finals.clone())));
        assert_eq!(session.status, SessionStatus::Ended);
        assert_eq!(session.revision, 3);
        assert!(session.ended_at.is_some());
        assert_eq!(session.final_metrics, Some(finals));

        // Late metric against an ended session is dropped, revision unchanged
        assert!(!session.log_metric(Metric::new().with_heart_rate(120)));
        assert_eq!(session.metrics.len(), 0);
        assert_eq!(session.revision, 3);
    }

    #[test]
    fn test_invalid_transitions_are_noops() {
        let mut session = WorkoutSession::new("watch-b");

        // resume from Running does nothing
        assert!(!session.resume());
        assert_eq!(session.revision, 1);

        session.pause();
        // pause from Paused does nothing
        assert!(!session.pause());
        assert_eq!(session.revision, 2);

        session.end(None);
        // nothing leaves Ended
        assert!(!session.pause());
        assert!(!session.resume());
        assert!(!session.end(None));
        assert_eq!(session.revision, 3);
    }

    #[test]
    fn test_log_metric_bumps_revision() {
        let mut session = WorkoutSession::new("watch-b");

        assert!(session.log_metric(Metric::new().with_heart_rate(131)));
        assert!(session.log_metric(Metric::new().with_heart_rate(140)));

        assert_eq!(session.metrics.len(), 2);
        assert_eq!(session.revision, 3);
    }

    #[test]
    fn test_status_precedence_ordering() {
        assert!(SessionStatus::Running.precedence() < SessionStatus::Paused.precedence());
        assert!(SessionStatus::Paused.precedence() < SessionStatus::Ended.precedence());
    }

    #[test]
    fn test_session_json_roundtrip() {
        let mut session = WorkoutSession::new("watch-b");
        session.log_metric(Metric::new().with_heart_rate(128).with_cadence(88));
        session.end(None);

        let json = serde_json::to_string(&session).unwrap();
        let parsed: WorkoutSession = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, session);
    }
}
