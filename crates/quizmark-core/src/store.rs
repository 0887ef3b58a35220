//! Submission store — a single JSON file owning the full submission list.
//!
//! Every mutation is a read-entire / modify / write-entire cycle against
//! one container file, serialized behind an internal lock so concurrent
//! appends cannot lose each other's records. Writes land via a temp-file
//! rename, so a concurrent reader never observes a half-written container.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::model::Submission;

/// Persistent, append-mostly collection of [`Submission`] records.
///
/// Cloning yields another handle to the same container and the same lock,
/// so one store can be shared across request handlers.
#[derive(Clone)]
pub struct SubmissionStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
    #[cfg(test)]
    mid_write_delay: Option<std::time::Duration>,
}

impl SubmissionStore {
    /// Create a handle for the container at `path`. No I/O happens until
    /// [`initialize`](Self::initialize) or an operation is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
            #[cfg(test)]
            mid_write_delay: None,
        }
    }

    /// Location of the backing container.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the container exists, creating it with an empty list if
    /// absent. Idempotent, safe to call on every process start.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| self.io_error(source))?;
            }
        }
        let exists = tokio::fs::try_exists(&self.path)
            .await
            .map_err(|source| self.io_error(source))?;
        if !exists {
            self.write_all(&[]).await?;
            tracing::debug!(path = %self.path.display(), "created empty submission container");
        }
        Ok(())
    }

    /// Read every submission, newest (highest id) first.
    ///
    /// The descending order is an explicit sort here, not an assumption
    /// about container write order.
    pub async fn list_all(&self) -> Result<Vec<Submission>, StoreError> {
        let mut submissions = self.read_all().await?;
        submissions.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(submissions)
    }

    /// Append one record to the container.
    ///
    /// The store does not validate or deduplicate ids; assigning unique,
    /// increasing ids is the caller's contract.
    pub async fn append(&self, record: Submission) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut submissions = self.read_all().await?;
        submissions.push(record);
        #[cfg(test)]
        {
            if let Some(delay) = self.mid_write_delay {
                tokio::time::sleep(delay).await;
            }
        }
        self.write_all(&submissions).await
    }

    /// Remove the record with the given id. Returns whether a record was
    /// found and removed; `Ok(false)` is the not-found signal, distinct
    /// from an I/O failure.
    pub async fn delete_by_id(&self, id: i64) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut submissions = self.read_all().await?;
        let before = submissions.len();
        submissions.retain(|s| s.id != id);
        if submissions.len() == before {
            return Ok(false);
        }
        self.write_all(&submissions).await?;
        Ok(true)
    }

    async fn read_all(&self) -> Result<Vec<Submission>, StoreError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| self.io_error(source))?;
        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace the container contents atomically: write a sibling temp
    /// file, then rename it over the container.
    async fn write_all(&self, submissions: &[Submission]) -> Result<(), StoreError> {
        let json =
            serde_json::to_string_pretty(submissions).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|source| self.io_error(source))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| self.io_error(source))?;
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
