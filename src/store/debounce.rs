//! Debounced write-behind persistence.
//!
//! A single background task owns all saves for one collection. Mutation
//! signals restart a quiescence window; when the window elapses without a
//! newer signal, exactly one save runs against a snapshot taken at fire
//! time. Saves therefore never overlap, and a burst of N rapid mutations
//! produces a single write.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

use crate::models::Record;
use crate::storage::StorageAdapter;

use super::lock;

/// Default quiescence window between the last mutation and the save.
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(400);

enum Signal {
    Mutated,
    Flush(oneshot::Sender<()>),
}

/// Handle to the background persistence task.
#[derive(Clone)]
pub(crate) struct Debouncer {
    tx: mpsc::UnboundedSender<Signal>,
}

impl Debouncer {
    /// Spawns the persistence task for `records` and returns its handle.
    pub(crate) fn spawn<T: Record>(
        records: Arc<Mutex<Vec<T>>>,
        adapter: Arc<dyn StorageAdapter<T>>,
        window: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(records, adapter, window, rx));
        Self { tx }
    }

    /// Signals a mutation, restarting the quiescence window.
    ///
    /// Infallible from the caller's point of view; if the task is gone the
    /// mutation still lives in memory and there is nothing useful to do.
    pub(crate) fn arm(&self) {
        let _ = self.tx.send(Signal::Mutated);
    }

    /// Cancels any pending window and persists immediately, waiting for the
    /// save to finish.
    pub(crate) async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Signal::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }
}

async fn run<T: Record>(
    records: Arc<Mutex<Vec<T>>>,
    adapter: Arc<dyn StorageAdapter<T>>,
    window: Duration,
    mut rx: mpsc::UnboundedReceiver<Signal>,
) {
    while let Some(signal) = rx.recv().await {
        match signal {
            Signal::Flush(ack) => {
                persist(&records, adapter.as_ref()).await;
                let _ = ack.send(());
            }
            Signal::Mutated => loop {
                tokio::select! {
                    _ = tokio::time::sleep(window) => {
                        persist(&records, adapter.as_ref()).await;
                        break;
                    }
                    next = rx.recv() => match next {
                        // a newer mutation restarts the window
                        Some(Signal::Mutated) => continue,
                        Some(Signal::Flush(ack)) => {
                            persist(&records, adapter.as_ref()).await;
                            let _ = ack.send(());
                            break;
                        }
                        None => {
                            // store dropped with a window pending: flush once
                            persist(&records, adapter.as_ref()).await;
                            return;
                        }
                    }
                }
            },
        }
    }
}

/// Saves a snapshot of the collection. A failed save keeps the in-memory
/// state authoritative and is not retried here; the next mutation's debounce
/// cycle is the retry mechanism.
async fn persist<T: Record>(records: &Mutex<Vec<T>>, adapter: &dyn StorageAdapter<T>) {
    let snapshot = lock(records).clone();
    if let Err(e) = adapter.save(&snapshot).await {
        tracing::warn!(
            "Deferred save failed, keeping {} record(s) in memory: {}",
            snapshot.len(),
            e
        );
    }
}
