use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

use super::{StorageAdapter, StorageError};
use crate::models::Record;

/// Remote persistence against an HTTP document store.
///
/// The collection travels as the same JSON array the file adapter writes, so
/// every device on the account reads and writes one encoding. GET fetches the
/// whole document, PUT replaces it; the server is expected to apply the PUT
/// atomically.
pub struct RemoteStorage<T> {
    server_url: String,
    api_key: String,
    collection: String,
    client: reqwest::Client,
    _marker: PhantomData<fn() -> T>,
}

impl<T> RemoteStorage<T> {
    pub fn new(
        server_url: String,
        api_key: String,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            server_url,
            api_key,
            collection: collection.into(),
            client: reqwest::Client::new(),
            _marker: PhantomData,
        }
    }

    /// Builds the document URL, normalizing a bare host to http.
    fn document_url(&self) -> String {
        let base = if self.server_url.starts_with("http://")
            || self.server_url.starts_with("https://")
        {
            self.server_url.clone()
        } else {
            format!("http://{}", self.server_url)
        };
        format!(
            "{}/collections/{}",
            base.trim_end_matches('/'),
            self.collection
        )
    }
}

#[async_trait]
impl<T> StorageAdapter<T> for RemoteStorage<T>
where
    T: Record + Serialize + DeserializeOwned,
{
    async fn load(&self) -> Result<Vec<T>, StorageError> {
        let response = self
            .client
            .get(self.document_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| StorageError::Http(e.to_string()))?;

        // A collection that was never uploaded is empty, not an error
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(StorageError::Http(format!(
                "Server returned status {}",
                response.status()
            )));
        }

        match response.json::<Vec<T>>().await {
            Ok(records) => Ok(records),
            Err(e) => {
                tracing::warn!(
                    "Ignoring malformed remote collection '{}': {}",
                    self.collection,
                    e
                );
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, records: &[T]) -> Result<(), StorageError> {
        let response = self
            .client
            .put(self.document_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(records)
            .send()
            .await
            .map_err(|e| StorageError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StorageError::Http(format!(
                "Server returned status {}",
                response.status()
            )));
        }

        Ok(())
    }
}
