//! S3-backed object store
//!
//! Wraps the AWS SDK client behind the [`ObjectStore`] trait. Uploads use
//! `PutObject` with a file-backed byte stream, verification uses `HeadObject`
//! and bucket bootstrap uses `HeadBucket`/`CreateBucket`.
//!
//! # Example
//!
//! ```no_run
//! use tripdata_mirror::config::StoreConfig;
//! use tripdata_mirror::store::{ObjectStore, S3Store};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StoreConfig {
//!     bucket: "tripdata".to_string(),
//!     region: "us-east-1".to_string(),
//!     endpoint: Some("http://localhost:9000".to_string()),
//!     access_key: Some("minioadmin".to_string()),
//!     secret_key: Some("minioadmin".to_string()),
//! };
//!
//! let store = S3Store::new(&config).await?;
//! store.ensure_bucket("tripdata").await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use std::path::Path;

use super::{ObjectStore, StoreError};
use crate::config::StoreConfig;

/// S3 object store
pub struct S3Store {
    client: aws_sdk_s3::Client,
    region: String,
}

impl S3Store {
    /// Create a new S3 store from configuration
    ///
    /// Static credentials from the config take precedence over the default
    /// provider chain. When a custom endpoint is configured (MinIO, RustFS,
    /// LocalStack) path-style addressing is enabled.
    pub async fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
            loader = loader.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "tripdata-mirror-config",
            ));
        }

        let shared = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
            region: config.region.clone(),
        })
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    #[tracing::instrument(
        name = "s3.put_object",
        skip(self, source),
        fields(
            s3.bucket = %bucket,
            s3.key = %key,
            http.method = "PUT",
            upload.chunk_size = chunk_size
        ),
        err
    )]
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        source: &Path,
        chunk_size: usize,
    ) -> Result<(), StoreError> {
        // reading the local file has not touched the network yet; surface it
        // as an I/O failure rather than a store request failure
        let body = ByteStream::read_from()
            .path(source)
            .buffer_size(chunk_size)
            .build()
            .await
            .map_err(|e| StoreError::IoError(std::io::Error::new(std::io::ErrorKind::Other, e)))?;

        let response = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| StoreError::RequestError(e.to_string()))?;

        tracing::info!(etag = ?response.e_tag(), "PutObject completed");

        Ok(())
    }

    #[tracing::instrument(
        name = "s3.head_object",
        skip(self),
        fields(s3.bucket = %bucket, s3.key = %key, http.method = "HEAD")
    )]
    async fn object_exists(&self, bucket: &str, key: &str) -> Result<bool, StoreError> {
        match self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => {
                if err
                    .as_service_error()
                    .map(|e| e.is_not_found())
                    .unwrap_or(false)
                {
                    Ok(false)
                } else {
                    Err(StoreError::RequestError(err.to_string()))
                }
            }
        }
    }

    #[tracing::instrument(name = "s3.ensure_bucket", skip(self), fields(s3.bucket = %bucket))]
    async fn ensure_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => {
                tracing::debug!("bucket exists");
                Ok(())
            }
            Err(err)
                if err
                    .as_service_error()
                    .map(|e| e.is_not_found())
                    .unwrap_or(false) =>
            {
                let mut request = self.client.create_bucket().bucket(bucket);

                // us-east-1 is the default and rejects an explicit constraint
                if self.region != "us-east-1" {
                    let constraint = BucketLocationConstraint::from(self.region.as_str());
                    request = request.create_bucket_configuration(
                        CreateBucketConfiguration::builder()
                            .location_constraint(constraint)
                            .build(),
                    );
                }

                request
                    .send()
                    .await
                    .map_err(|e| StoreError::RequestError(e.to_string()))?;

                tracing::info!("created bucket");
                Ok(())
            }
            Err(err) => {
                let status = err.raw_response().map(|r| r.status().as_u16());
                if status == Some(403) {
                    Err(StoreError::BucketForbidden(bucket.to_string()))
                } else {
                    Err(StoreError::RequestError(err.to_string()))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> StoreConfig {
        StoreConfig {
            bucket: "tripdata".into(),
            region: "us-east-1".into(),
            endpoint: Some("http://localhost:9000".into()),
            access_key: Some("test-access".into()),
            secret_key: Some("test-secret".into()),
        }
    }

    #[tokio::test]
    async fn missing_local_file_surfaces_as_io_error() {
        let store = S3Store::new(&local_config()).await.unwrap();

        // fails while opening the local file, before any request is made
        let error = store
            .put_object(
                "tripdata",
                "yellow_tripdata_2019-01.csv.gz",
                Path::new("no-such-file.csv.gz"),
                8192,
            )
            .await
            .unwrap_err();

        assert!(matches!(error, StoreError::IoError(_)));
    }
}
