//! Live session lifecycle on top of the session store.

use std::collections::BTreeMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::models::{Metric, MetricValue, SessionStatus, WorkoutSession};

use super::{lock, Store};

/// Outcome of a lifecycle call: the session as it now stands, and whether
/// the transition actually applied. An invalid transition is a no-op, not a
/// fault, so `applied` is false and the session is returned unchanged.
#[derive(Debug, Clone)]
pub struct Transition {
    pub session: WorkoutSession,
    pub applied: bool,
}

/// Precondition failures a caller must handle.
#[derive(Debug)]
pub enum SessionError {
    /// This device already has a running session.
    AlreadyRunning(Uuid),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::AlreadyRunning(id) => {
                write!(f, "A session is already running on this device: {}", id)
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// Drives the Running/Paused/Ended state machine over the session store and
/// enforces the one-running-session-per-device rule.
///
/// The active-session pointer is recovered at construction from any Running
/// session owned by this device, so the invariant survives process restarts.
pub struct SessionTracker {
    store: Store<WorkoutSession>,
    device_id: String,
    active: Mutex<Option<Uuid>>,
}

impl SessionTracker {
    pub fn new(store: Store<WorkoutSession>, device_id: impl Into<String>) -> Self {
        let device_id = device_id.into();
        let active = store
            .all()
            .into_iter()
            .find(|s| s.status == SessionStatus::Running && s.device_id == device_id)
            .map(|s| s.id);

        Self {
            store,
            device_id,
            active: Mutex::new(active),
        }
    }

    pub fn store(&self) -> &Store<WorkoutSession> {
        &self.store
    }

    /// Id of this device's running session, if any.
    pub fn active_id(&self) -> Option<Uuid> {
        *lock(&self.active)
    }

    /// Starts a new session in `Running`.
    ///
    /// Fails the precondition when this device already has one running; that
    /// is a caller error, not a crash.
    pub fn start(&self) -> Result<WorkoutSession, SessionError> {
        let mut active = lock(&self.active);

        if let Some(id) = *active {
            match self.store.get(id) {
                Some(s) if s.status == SessionStatus::Running => {
                    return Err(SessionError::AlreadyRunning(id));
                }
                // ended or deleted elsewhere (e.g. by a merge): stale pointer
                _ => *active = None,
            }
        }

        let session = WorkoutSession::new(&self.device_id);
        *active = Some(session.id);
        drop(active);

        self.store.add(session.clone());
        Ok(session)
    }

    /// Running -> Paused. `None` when the id is unknown.
    pub fn pause(&self, id: Uuid) -> Option<Transition> {
        self.apply(id, WorkoutSession::pause)
    }

    /// Paused -> Running. `None` when the id is unknown.
    pub fn resume(&self, id: Uuid) -> Option<Transition> {
        self.apply(id, WorkoutSession::resume)
    }

    /// Appends a metric sample. Late samples against an ended session are
    /// dropped with `applied == false`.
    pub fn log_metric(&self, id: Uuid, metric: Metric) -> Option<Transition> {
        self.apply(id, |session| session.log_metric(metric))
    }

    /// Ends the session and stores the final metrics snapshot, clearing the
    /// active pointer when this was the active session.
    pub fn end(
        &self,
        id: Uuid,
        final_metrics: Option<BTreeMap<String, MetricValue>>,
    ) -> Option<Transition> {
        let transition = self.apply(id, |session| session.end(final_metrics))?;

        if transition.applied {
            let mut active = lock(&self.active);
            if *active == Some(id) {
                *active = None;
            }
        }

        Some(transition)
    }

    fn apply(
        &self,
        id: Uuid,
        transition: impl FnOnce(&mut WorkoutSession) -> bool,
    ) -> Option<Transition> {
        let mut session = self.store.get(id)?;
        let applied = transition(&mut session);
        if applied {
            self.store.update(session.clone());
        }
        Some(Transition { session, applied })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStorage, StorageAdapter};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    const WINDOW: Duration = Duration::from_millis(30);

    async fn tracker() -> (SessionTracker, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let adapter: Arc<dyn StorageAdapter<WorkoutSession>> =
            Arc::new(FileStorage::new(temp_dir.path().join("sessions.json")));
        let store = Store::open(adapter, WINDOW).await;
        (SessionTracker::new(store, "watch-b"), temp_dir)
    }

    #[tokio::test]
    async fn test_start_creates_running_session() {
        let (tracker, _temp) = tracker().await;

        let session = tracker.start().unwrap();

        assert_eq!(session.status, SessionStatus::Running);
        assert_eq!(session.revision, 1);
        assert_eq!(tracker.active_id(), Some(session.id));
    }

    #[tokio::test]
    async fn test_second_start_fails_while_running() {
        let (tracker, _temp) = tracker().await;
        let first = tracker.start().unwrap();

        let err = tracker.start().unwrap_err();

        match err {
            SessionError::AlreadyRunning(id) => assert_eq!(id, first.id),
        }
    }

    #[tokio::test]
    async fn test_start_allowed_after_end() {
        let (tracker, _temp) = tracker().await;
        let first = tracker.start().unwrap();
        let _ = tracker.end(first.id, None);

        assert!(tracker.active_id().is_none());
        assert!(tracker.start().is_ok());
    }

    #[tokio::test]
    async fn test_full_lifecycle_scenario() {
        let (tracker, _temp) = tracker().await;
        let session = tracker.start().unwrap();

        let paused = tracker.pause(session.id).unwrap();
        assert!(paused.applied);
        assert_eq!(paused.session.status, SessionStatus::Paused);
        assert_eq!(paused.session.revision, 2);

        let mut finals = BTreeMap::new();
        finals.insert("duration".to_string(), MetricValue::Number(1800.0));
        let ended = tracker.end(session.id, Some(finals)).unwrap();
        assert!(ended.applied);
        assert_eq!(ended.session.status, SessionStatus::Ended);
        assert_eq!(ended.session.revision, 3);
        assert!(ended.session.ended_at.is_some());

        // late metric: no-op, nothing changes
        let late = tracker
            .log_metric(session.id, Metric::new().with_heart_rate(120))
            .unwrap();
        assert!(!late.applied);
        assert_eq!(late.session.metrics.len(), 0);
        assert_eq!(late.session.revision, 3);
    }

    #[tokio::test]
    async fn test_pause_when_not_running_is_noop() {
        let (tracker, _temp) = tracker().await;
        let session = tracker.start().unwrap();
        let _ = tracker.pause(session.id);

        let again = tracker.pause(session.id).unwrap();

        assert!(!again.applied);
        assert_eq!(again.session.revision, 2);
    }

    #[tokio::test]
    async fn test_unknown_id_returns_none() {
        let (tracker, _temp) = tracker().await;

        assert!(tracker.pause(Uuid::new_v4()).is_none());
        assert!(tracker.log_metric(Uuid::new_v4(), Metric::new()).is_none());
        assert!(tracker.end(Uuid::new_v4(), None).is_none());
    }

    #[tokio::test]
    async fn test_log_metric_appends_and_bumps_revision() {
        let (tracker, _temp) = tracker().await;
        let session = tracker.start().unwrap();

        let _ = tracker.log_metric(session.id, Metric::new().with_heart_rate(131));
        let second = tracker
            .log_metric(session.id, Metric::new().with_heart_rate(145))
            .unwrap();

        assert!(second.applied);
        assert_eq!(second.session.metrics.len(), 2);
        assert_eq!(second.session.revision, 3);
    }

    #[tokio::test]
    async fn test_active_pointer_recovers_across_trackers() {
        let (tracker, temp) = tracker().await;
        let session = tracker.start().unwrap();
        tracker.store().flush().await;

        // a fresh tracker over a re-opened store sees the running session
        let adapter: Arc<dyn StorageAdapter<WorkoutSession>> =
            Arc::new(FileStorage::new(temp.path().join("sessions.json")));
        let store = Store::open(adapter, WINDOW).await;
        let revived = SessionTracker::new(store, "watch-b");

        assert_eq!(revived.active_id(), Some(session.id));
        assert!(matches!(
            revived.start(),
            Err(SessionError::AlreadyRunning(_))
        ));
    }

    #[tokio::test]
    async fn test_other_devices_sessions_do_not_block_start() {
        let (tracker, _temp) = tracker().await;
        tracker
            .store()
            .add(WorkoutSession::new("phone-a"));

        assert!(tracker.start().is_ok());
    }
}
