//! Persistence adapters for record collections.
//!
//! A collection persists as one self-describing JSON document (an array of
//! records). Two adapters exist: the always-available local file adapter and
//! an HTTP document adapter selected when a remote endpoint is configured.

mod file;
mod remote;

pub use file::FileStorage;
pub use remote::RemoteStorage;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::models::Record;

/// Abstract durable storage for one record collection.
///
/// `load` treats "nothing there yet" as an empty collection, not an error,
/// and degrades malformed data to empty with a logged warning. `save` writes
/// the whole collection atomically; the destination never observes a partial
/// document.
#[async_trait]
pub trait StorageAdapter<T>: Send + Sync {
    async fn load(&self) -> Result<Vec<T>, StorageError>;
    async fn save(&self, records: &[T]) -> Result<(), StorageError>;
}

/// Picks the backend for a named collection: remote when both server URL and
/// API key are configured, the local file adapter otherwise. Absence of the
/// remote settings is the signal to default to local, not an error.
pub fn for_collection<T>(config: &Config, name: &str) -> Arc<dyn StorageAdapter<T>>
where
    T: Record + Serialize + DeserializeOwned,
{
    if let (Some(url), Some(key)) = (&config.sync.server_url, &config.sync.api_key) {
        Arc::new(RemoteStorage::new(url.clone(), key.clone(), name))
    } else {
        Arc::new(FileStorage::new(
            config.data_dir.join(format!("{}.json", name)),
        ))
    }
}

/// Errors surfaced by the storage adapters.
///
/// Decode failures never reach here; the adapters degrade those to an empty
/// collection internally.
#[derive(Debug)]
pub enum StorageError {
    Io(PathBuf, std::io::Error),
    Encode(serde_json::Error),
    Http(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(path, e) => {
                write!(f, "I/O error for {}: {}", path.display(), e)
            }
            StorageError::Encode(e) => write!(f, "Failed to encode collection: {}", e),
            StorageError::Http(e) => write!(f, "Remote storage error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(_, e) => Some(e),
            StorageError::Encode(e) => Some(e),
            StorageError::Http(_) => None,
        }
    }
}
