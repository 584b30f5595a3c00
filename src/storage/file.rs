use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use std::marker::PhantomData;
use std::path::PathBuf;

use super::{StorageAdapter, StorageError};
use crate::models::Record;

/// Local-file persistence: one pretty-printed JSON document per collection.
///
/// Saves go through a temp file in the same directory followed by a rename,
/// so a crash mid-write never leaves a truncated document behind.
pub struct FileStorage<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> FileStorage<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl<T> StorageAdapter<T> for FileStorage<T>
where
    T: Record + Serialize + DeserializeOwned,
{
    async fn load(&self) -> Result<Vec<T>, StorageError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::Io(self.path.clone(), e)),
        };

        if bytes.is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_slice(&bytes) {
            Ok(records) => Ok(records),
            Err(e) => {
                tracing::warn!(
                    "Ignoring malformed collection at {}: {}",
                    self.path.display(),
                    e
                );
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, records: &[T]) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| StorageError::Io(dir.to_path_buf(), e))?;
        }

        let json = serde_json::to_vec_pretty(records).map_err(StorageError::Encode)?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|e| StorageError::Io(tmp.clone(), e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StorageError::Io(self.path.clone(), e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Exercise, WeightEntry, WorkoutRecord};
    use tempfile::TempDir;

    fn test_storage<T>(name: &str) -> (FileStorage<T>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path().join(name));
        (storage, temp_dir)
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let (storage, _temp) = test_storage::<WeightEntry>("weights.json");

        let records = storage.load().await.unwrap();

        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_load_zero_byte_file_is_empty() {
        let (storage, _temp) = test_storage::<WeightEntry>("weights.json");
        std::fs::write(storage.path(), b"").unwrap();

        let records = storage.load().await.unwrap();

        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_load_malformed_file_degrades_to_empty() {
        let (storage, _temp) = test_storage::<WeightEntry>("weights.json");
        std::fs::write(storage.path(), b"{not json").unwrap();

        let records = storage.load().await.unwrap();

        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_save_and_load_roundtrip() {
        let (storage, _temp) = test_storage::<WeightEntry>("weights.json");
        let records = vec![
            WeightEntry::new(82.4, "phone-a"),
            WeightEntry::new(82.1, "phone-a"),
        ];

        storage.save(&records).await.unwrap();
        let loaded = storage.load().await.unwrap();

        assert_eq!(loaded, records);
    }

    #[tokio::test]
    async fn test_roundtrip_preserves_nested_workout_fields() {
        let (storage, _temp) = test_storage::<WorkoutRecord>("workouts.json");
        let mut workout = WorkoutRecord::new("phone-a")
            .with_exercise(Exercise::new("Bench Press").with_set(8, 80.0));
        workout.complete();

        storage.save(&[workout.clone()]).await.unwrap();
        let loaded = storage.load().await.unwrap();

        assert_eq!(loaded, vec![workout]);
    }

    #[tokio::test]
    async fn test_save_creates_data_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("nested").join("weights.json");
        let storage = FileStorage::<WeightEntry>::new(nested.clone());

        storage.save(&[WeightEntry::new(80.0, "phone-a")]).await.unwrap();

        assert!(nested.exists());
    }

    #[tokio::test]
    async fn test_save_leaves_no_temp_file() {
        let (storage, temp) = test_storage::<WeightEntry>("weights.json");

        storage.save(&[WeightEntry::new(80.0, "phone-a")]).await.unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map(|x| x == "tmp").unwrap_or(false))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_document() {
        let (storage, _temp) = test_storage::<WeightEntry>("weights.json");

        storage.save(&[WeightEntry::new(80.0, "phone-a")]).await.unwrap();
        let second = vec![WeightEntry::new(79.5, "phone-a")];
        storage.save(&second).await.unwrap();

        assert_eq!(storage.load().await.unwrap(), second);
    }
}
