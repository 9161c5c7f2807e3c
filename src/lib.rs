//! Tripdata Mirror Library
//!
//! Mirrors monthly trip-data release files into S3-compatible object storage.
//!
//! # Features
//!
//! - **Reliable Upload**: Every upload is verified with an existence check
//!   and retried a bounded number of times on any failure
//! - **Bounded Worker Pool**: Downloads and uploads run over a fixed-size
//!   pool of independent tasks
//! - **Pluggable Store**: Uploads go through the [`store::ObjectStore`]
//!   trait, so the S3 backend can be swapped for a test fake
//!
//! # Example
//!
//! ```no_run
//! use tripdata_mirror::config::Config;
//! use tripdata_mirror::store::S3Store;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::load("config.yaml")?;
//! let store = S3Store::new(&config.store).await?;
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod download;
pub mod store;
pub mod transfer;

// Re-export commonly used types
pub use config::Config;
pub use transfer::{RetryPolicy, TransferTask};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
