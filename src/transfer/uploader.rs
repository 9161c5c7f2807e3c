//! Reliable uploader
//!
//! Streams a local file to the object store, confirms the object actually
//! landed with an existence check, and retries a bounded number of times on
//! any failure. Exhausting the retry budget yields a [`GiveUpError`] for the
//! caller to report; it never aborts unrelated tasks.

use super::{AttemptError, GiveUpError, RetryPolicy, TransferTask};
use crate::store::ObjectStore;

/// Result of a successful `upload` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Transfer confirmed present at the destination
    Verified,
    /// The task had no local file (upstream download failed); nothing was attempted
    SkippedMissingSource,
}

/// Upload a task with retry and post-upload verification
///
/// For each attempt the file is streamed to the destination key, then the
/// store is queried for the object's existence. A transfer error skips
/// verification for that attempt. A failed or unreachable existence check
/// counts as a verification failure. Between attempts the worker sleeps
/// `policy.retry_delay`; no delay follows the final attempt.
///
/// `policy.max_attempts` is clamped to a minimum of one attempt.
#[tracing::instrument(
    name = "transfer.upload",
    skip(store, task, policy),
    fields(bucket = %task.bucket, key = %task.key)
)]
pub async fn upload(
    store: &dyn ObjectStore,
    task: &TransferTask,
    policy: &RetryPolicy,
) -> Result<UploadOutcome, GiveUpError> {
    let Some(source) = task.source.as_deref() else {
        tracing::warn!("no local file for task, skipping upload");
        return Ok(UploadOutcome::SkippedMissingSource);
    };

    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = AttemptError::Verification;

    for attempt in 1..=max_attempts {
        tracing::info!(attempt, max_attempts, "uploading");

        match store
            .put_object(&task.bucket, &task.key, source, task.chunk_size)
            .await
        {
            Ok(()) => match store.object_exists(&task.bucket, &task.key).await {
                Ok(true) => {
                    tracing::info!(attempt, "upload verified");
                    return Ok(UploadOutcome::Verified);
                }
                Ok(false) => {
                    tracing::warn!(attempt, "verification failed, object absent");
                    last_error = AttemptError::Verification;
                }
                Err(error) => {
                    tracing::warn!(attempt, %error, "existence check unreachable");
                    last_error = AttemptError::Verification;
                }
            },
            Err(error) => {
                tracing::warn!(attempt, %error, "transfer failed");
                last_error = AttemptError::Transfer(error);
            }
        }

        if attempt < max_attempts {
            tokio::time::sleep(policy.retry_delay).await;
        }
    }

    let error = GiveUpError {
        key: task.key.clone(),
        attempts: max_attempts,
        last_error,
    };
    tracing::error!(%error, "giving up");
    Err(error)
}
