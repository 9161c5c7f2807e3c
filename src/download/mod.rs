//! Download module
//!
//! Builds release archive URLs for monthly trip-data files and streams them
//! to the local download directory.

use bytes::Bytes;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// Download errors
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// One monthly file in the release archive
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasetItem {
    pub category: String,
    pub year: u16,
    pub month: u8,
}

impl DatasetItem {
    pub fn new(category: impl Into<String>, year: u16, month: u8) -> Self {
        Self {
            category: category.into(),
            year,
            month,
        }
    }

    /// File name as published in the release archive, e.g.
    /// `yellow_tripdata_2019-01.csv.gz`
    pub fn file_name(&self) -> String {
        format!(
            "{}_tripdata_{}-{:02}.csv.gz",
            self.category, self.year, self.month
        )
    }
}

/// Release archive location
///
/// Releases are grouped by category: `{base_url}/{category}/{file_name}`.
#[derive(Debug, Clone)]
pub struct ReleaseSource {
    base_url: String,
}

impl ReleaseSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// Download URL for a dataset item
    pub fn url_for(&self, item: &DatasetItem) -> String {
        format!("{}/{}/{}", self.base_url, item.category, item.file_name())
    }
}

/// Streams release files to a local directory
pub struct Downloader {
    http: reqwest::Client,
    download_dir: PathBuf,
}

impl Downloader {
    /// Create a downloader, creating the download directory if needed
    pub fn new(download_dir: impl AsRef<Path>) -> Result<Self, DownloadError> {
        let download_dir = download_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&download_dir)?;

        Ok(Self {
            http: reqwest::Client::new(),
            download_dir,
        })
    }

    /// Download one dataset item, returning the local file path
    ///
    /// The response body is streamed to disk chunk by chunk; nothing is
    /// buffered in memory beyond a single chunk.
    #[tracing::instrument(
        name = "download.fetch",
        skip(self, source),
        fields(file = %item.file_name()),
        err
    )]
    pub async fn fetch(
        &self,
        source: &ReleaseSource,
        item: &DatasetItem,
    ) -> Result<PathBuf, DownloadError> {
        let url = source.url_for(item);
        let path = self.download_dir.join(item.file_name());

        tracing::info!(%url, "downloading");

        let response = self.http.get(&url).send().await?.error_for_status()?;

        let mut file = tokio::fs::File::create(&path).await?;
        match Self::write_body(&mut file, response).await {
            Ok(bytes_written) => {
                tracing::info!(bytes = bytes_written, path = %path.display(), "downloaded");
                Ok(path)
            }
            Err(error) => {
                // a truncated file must never survive to be picked up as a
                // completed download on a later run
                drop(file);
                let _ = tokio::fs::remove_file(&path).await;
                Err(error)
            }
        }
    }

    async fn write_body(
        file: &mut tokio::fs::File,
        response: reqwest::Response,
    ) -> Result<u64, DownloadError> {
        let mut stream = response.bytes_stream();
        let mut bytes_written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk: Bytes = chunk?;
            file.write_all(&chunk).await?;
            bytes_written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(bytes_written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_pads_month() {
        let item = DatasetItem::new("yellow", 2019, 1);
        assert_eq!(item.file_name(), "yellow_tripdata_2019-01.csv.gz");

        let item = DatasetItem::new("green", 2020, 12);
        assert_eq!(item.file_name(), "green_tripdata_2020-12.csv.gz");
    }

    #[test]
    fn test_url_for_groups_by_category() {
        let source = ReleaseSource::new("https://example.com/releases/download");
        let item = DatasetItem::new("yellow", 2019, 1);
        assert_eq!(
            source.url_for(&item),
            "https://example.com/releases/download/yellow/yellow_tripdata_2019-01.csv.gz"
        );
    }

    #[test]
    fn test_release_source_strips_trailing_slash() {
        let source = ReleaseSource::new("https://example.com/releases/");
        let item = DatasetItem::new("green", 2020, 7);
        assert_eq!(
            source.url_for(&item),
            "https://example.com/releases/green/green_tripdata_2020-07.csv.gz"
        );
    }
}
