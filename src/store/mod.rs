//! Object store module
//!
//! Defines the [`ObjectStore`] trait the uploader is written against and the
//! S3-backed implementation used in production. The trait exists so tests can
//! substitute a fake store and script transfer or verification failures.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

mod s3;

pub use s3::S3Store;

/// Object store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Store request failed: {0}")]
    RequestError(String),

    #[error("Bucket '{0}' exists but is not accessible")]
    BucketForbidden(String),
}

/// Remote key-addressed binary storage
///
/// Implementations stream local files to a bucket and answer read-only
/// existence queries used for post-upload verification.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stream a local file to `bucket`/`key`, reading `chunk_size` bytes at a time
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        source: &Path,
        chunk_size: usize,
    ) -> Result<(), StoreError>;

    /// Check whether an object is present at `bucket`/`key`
    async fn object_exists(&self, bucket: &str, key: &str) -> Result<bool, StoreError>;

    /// Create `bucket` if it does not exist yet
    async fn ensure_bucket(&self, bucket: &str) -> Result<(), StoreError>;
}
