//! Store error types.
//!
//! Defined here so callers can classify storage failures without string
//! matching. A deletion that finds nothing is not an error; it is the
//! `Ok(false)` return of [`crate::store::SubmissionStore::delete_by_id`].

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while accessing the submission container.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The container could not be read or written.
    #[error("failed to access submission container {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The container exists but does not hold a valid submission list.
    #[error("invalid submission JSON in {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
