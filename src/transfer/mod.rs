//! Transfer module
//!
//! Types and the retry-and-verify uploader for moving a downloaded file into
//! the object store.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::store::StoreError;

mod uploader;

pub use uploader::{upload, UploadOutcome};

/// A single file to move into the object store
///
/// Immutable once created. `source` is `None` when the upstream download
/// failed; the uploader skips such tasks without spending any attempts.
#[derive(Debug, Clone)]
pub struct TransferTask {
    pub source: Option<PathBuf>,
    pub bucket: String,
    pub key: String,
    pub chunk_size: usize,
}

impl TransferTask {
    /// Create a task for a downloaded file
    pub fn new(
        source: Option<PathBuf>,
        bucket: impl Into<String>,
        key: impl Into<String>,
        chunk_size: usize,
    ) -> Self {
        Self {
            source,
            bucket: bucket.into(),
            key: key.into(),
            chunk_size,
        }
    }
}

/// Retry budget and delay between attempts
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            max_attempts,
            retry_delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_secs(5),
        }
    }
}

/// Outcome of a single failed attempt
#[derive(Error, Debug)]
pub enum AttemptError {
    #[error("transfer failed: {0}")]
    Transfer(#[source] StoreError),

    #[error("object absent at destination after upload")]
    Verification,
}

/// Terminal failure after exhausting the retry budget
///
/// Returned to the caller and logged, never propagated as a fault that stops
/// unrelated tasks.
#[derive(Error, Debug)]
#[error("giving up on '{key}' after {attempts} attempts: {last_error}")]
pub struct GiveUpError {
    pub key: String,
    pub attempts: u32,
    #[source]
    pub last_error: AttemptError,
}
