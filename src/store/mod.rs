//! The record store: authoritative in-memory collections with debounced
//! write-behind persistence and revision-based merging.

mod debounce;
mod merge;
mod session;

pub use debounce::DEFAULT_DEBOUNCE_WINDOW;
pub use merge::merge_records;
pub use session::{SessionError, SessionTracker, Transition};

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

use crate::models::Record;
use crate::storage::StorageAdapter;

use debounce::Debouncer;

/// Locks a collection, recovering the data if a panicking thread poisoned
/// the mutex. The store prefers availability over strict consistency.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Authoritative in-memory collection of one record type.
///
/// CRUD calls are synchronous with respect to memory; the caller observes the
/// new state immediately. Durability happens later: every mutation arms the
/// debounce pipeline and a single background task performs the actual save.
/// Clones share the same collection and pipeline.
pub struct Store<T: Record> {
    records: Arc<Mutex<Vec<T>>>,
    debouncer: Debouncer,
}

impl<T: Record> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            debouncer: self.debouncer.clone(),
        }
    }
}

impl<T: Record> Store<T> {
    /// Loads the collection from the adapter and arms the pipeline.
    ///
    /// The startup load populates memory without scheduling a save; there is
    /// no point re-writing the data that was just read. A failed load is
    /// logged and the store starts empty rather than failing the caller.
    pub async fn open(adapter: Arc<dyn StorageAdapter<T>>, window: Duration) -> Self {
        let initial = match adapter.load().await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Load failed, starting with an empty collection: {}", e);
                Vec::new()
            }
        };
        tracing::debug!("Loaded {} record(s)", initial.len());

        let records = Arc::new(Mutex::new(initial));
        let debouncer = Debouncer::spawn(Arc::clone(&records), adapter, window);

        Self { records, debouncer }
    }

    /// Adds a record. Storage order is insertion order; retrieval through
    /// [`Store::all`] is most-recent-first.
    pub fn add(&self, record: T) {
        lock(&self.records).push(record);
        self.debouncer.arm();
    }

    /// Replaces the stored record with the same id.
    ///
    /// Returns false without error when the id is unknown; racing a
    /// concurrent deletion is normal, not a fault. Does not bump the
    /// revision itself; revision semantics belong to the model mutators and
    /// the merge path.
    pub fn update(&self, record: T) -> bool {
        let mut records = lock(&self.records);
        match records.iter_mut().find(|r| r.id() == record.id()) {
            Some(slot) => {
                *slot = record;
                drop(records);
                self.debouncer.arm();
                true
            }
            None => false,
        }
    }

    /// Removes the record with the given id, if present.
    pub fn delete(&self, id: Uuid) -> bool {
        let mut records = lock(&self.records);
        let before = records.len();
        records.retain(|r| r.id() != id);
        let removed = records.len() != before;
        drop(records);
        if removed {
            self.debouncer.arm();
        }
        removed
    }

    /// Snapshot of one record.
    pub fn get(&self, id: Uuid) -> Option<T> {
        lock(&self.records).iter().find(|r| r.id() == id).cloned()
    }

    /// Consistent snapshot of the whole collection in presentation order
    /// (most-recent-first), not a live view. Later mutations do not show up
    /// in a snapshot already taken.
    pub fn all(&self) -> Vec<T> {
        lock(&self.records).iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.records).is_empty()
    }

    /// Merges a peer's copy of the collection into this one and schedules a
    /// save. See [`merge_records`] for the resolution rule.
    pub fn merge_remote(&self, remote: &[T]) {
        let mut records = lock(&self.records);
        let merged = merge_records(records.as_slice(), remote);
        *records = merged;
        drop(records);
        self.debouncer.arm();
    }

    /// Cancels any pending debounce window and persists now, waiting for the
    /// save to complete. For callers that need a durability guarantee before
    /// process exit.
    pub async fn flush(&self) {
        self.debouncer.flush().await;
    }
}
