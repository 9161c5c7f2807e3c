//! Configuration module for Tripdata Mirror
//!
//! Handles loading and parsing of YAML configuration files with support for
//! environment variable expansion and comprehensive validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::download::DatasetItem;

mod loader;

pub use loader::ConfigLoader;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub transfer: TransferConfig,
}

impl Config {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        ConfigLoader::load(path)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.bucket.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Store bucket name cannot be empty".into(),
            ));
        }

        if self.source.categories.is_empty() {
            return Err(ConfigError::ValidationError(
                "At least one category must be configured".into(),
            ));
        }

        if self.source.years.is_empty() {
            return Err(ConfigError::ValidationError(
                "At least one year must be configured".into(),
            ));
        }

        for month in &self.source.months {
            if !(1..=12).contains(month) {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid month {}: must be between 1 and 12",
                    month
                )));
            }
        }

        if self.transfer.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "max_attempts must be at least 1".into(),
            ));
        }

        if self.transfer.workers == 0 {
            return Err(ConfigError::ValidationError(
                "workers must be at least 1".into(),
            ));
        }

        if self.transfer.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "chunk_size must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

/// Object store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

/// Release archive source configuration
///
/// Describes which monthly files to mirror: the cartesian product of
/// `categories`, `years` and `months`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub categories: Vec<String>,
    pub years: Vec<u16>,
    #[serde(default = "default_months")]
    pub months: Vec<u8>,
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
}

impl SourceConfig {
    /// Enumerate every dataset item described by this source
    pub fn items(&self) -> Vec<DatasetItem> {
        let mut items = Vec::new();
        for category in &self.categories {
            for &year in &self.years {
                for &month in &self.months {
                    items.push(DatasetItem::new(category, year, month));
                }
            }
        }
        items
    }
}

fn default_base_url() -> String {
    "https://github.com/DataTalksClub/nyc-tlc-data/releases/download".to_string()
}

fn default_months() -> Vec<u8> {
    (1..=12).collect()
}

fn default_download_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Transfer configuration
///
/// Retry bound, delay between attempts, streaming chunk size and worker
/// pool size for both the download and upload phases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
            chunk_size: default_chunk_size(),
            workers: default_workers(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_secs() -> u64 {
    5
}

fn default_chunk_size() -> usize {
    8388608 // 8MB
}

fn default_workers() -> usize {
    4
}
