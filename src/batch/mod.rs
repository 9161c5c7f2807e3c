//! Batch module
//!
//! Maps the download step and the uploader over independent tasks with a
//! bounded worker pool. Tasks share no mutable state; completion order is
//! unspecified and results are associated back to their task by destination
//! key. The batch always runs to completion, collecting per-task give-ups
//! into a report instead of propagating them.

use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;

use crate::download::{DatasetItem, Downloader, ReleaseSource};
use crate::store::ObjectStore;
use crate::transfer::{upload, GiveUpError, RetryPolicy, TransferTask, UploadOutcome};

/// What happened to each task in a batch, keyed by destination key
///
/// Failed tasks are carried as their [`GiveUpError`], which already names
/// the destination key.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<GiveUpError>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.skipped.len() + self.failed.len()
    }

    /// Log a per-category summary of the finished batch
    pub fn log_summary(&self) {
        tracing::info!(
            total = self.total(),
            succeeded = self.succeeded.len(),
            skipped = self.skipped.len(),
            failed = self.failed.len(),
            "batch complete"
        );
        for key in &self.succeeded {
            tracing::info!(%key, "uploaded and verified");
        }
        for key in &self.skipped {
            tracing::warn!(%key, "skipped, no local file");
        }
        for error in &self.failed {
            tracing::error!(key = %error.key, %error, "gave up");
        }
    }
}

/// Download every dataset item over a bounded worker pool
///
/// A failed download is logged and reported as `None`; it never aborts the
/// rest of the batch.
pub async fn download_all(
    downloader: Arc<Downloader>,
    source: ReleaseSource,
    items: Vec<DatasetItem>,
    workers: usize,
) -> Vec<(DatasetItem, Option<PathBuf>)> {
    stream::iter(items)
        .map(|item| {
            let downloader = Arc::clone(&downloader);
            let source = source.clone();
            async move {
                let path = match downloader.fetch(&source, &item).await {
                    Ok(path) => Some(path),
                    Err(error) => {
                        tracing::error!(file = %item.file_name(), %error, "download failed");
                        None
                    }
                };
                (item, path)
            }
        })
        .buffer_unordered(workers.max(1))
        .collect()
        .await
}

/// Upload every task over a bounded worker pool
///
/// Each task gets the full retry budget from `policy`. The returned report
/// accounts for every input task exactly once.
pub async fn upload_all(
    store: Arc<dyn ObjectStore>,
    tasks: Vec<TransferTask>,
    policy: RetryPolicy,
    workers: usize,
) -> BatchReport {
    let results: Vec<(String, Result<UploadOutcome, GiveUpError>)> = stream::iter(tasks)
        .map(|task| {
            let store = Arc::clone(&store);
            let policy = policy.clone();
            async move {
                let key = task.key.clone();
                let result = upload(store.as_ref(), &task, &policy).await;
                (key, result)
            }
        })
        .buffer_unordered(workers.max(1))
        .collect()
        .await;

    let mut report = BatchReport::default();
    for (key, result) in results {
        match result {
            Ok(UploadOutcome::Verified) => report.succeeded.push(key),
            Ok(UploadOutcome::SkippedMissingSource) => report.skipped.push(key),
            Err(error) => report.failed.push(error),
        }
    }
    report
}
