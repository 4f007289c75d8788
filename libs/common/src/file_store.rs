//! Flat-file JSON document store
//!
//! A [`JsonFile`] holds one JSON array of records. Every mutation reloads the
//! array, applies the change and rewrites the whole file, all while holding
//! the per-file lock, so concurrent writers inside one process never lose
//! updates. The file is written to a sibling temp file and renamed into
//! place, and its parent directory is created on first write.

use crate::error::StorageResult;
use serde::{Serialize, de::DeserializeOwned};
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

/// A JSON array of `T` persisted at a single path
pub struct JsonFile<T> {
    path: PathBuf,
    lock: Mutex<()>,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            _records: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record; a missing file reads as empty
    pub async fn read_all(&self) -> StorageResult<Vec<T>> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    /// Apply `mutate` to the current records and persist the result
    ///
    /// If `mutate` fails nothing is written and its error is returned.
    pub async fn update<R, F>(&self, mutate: F) -> StorageResult<R>
    where
        F: FnOnce(&mut Vec<T>) -> StorageResult<R>,
    {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        let outcome = mutate(&mut records)?;
        self.store(&records).await?;
        Ok(outcome)
    }

    async fn load(&self) -> StorageResult<Vec<T>> {
        match fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn store(&self, records: &[T]) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let body = serde_json::to_vec_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).await?;
        fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), count = records.len(), "Rewrote data file");
        Ok(())
    }
}
