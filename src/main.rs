//! Tripdata Mirror - release archive to object storage
//!
//! Downloads monthly trip-data files from a public release archive and
//! re-uploads them to S3-compatible storage with retry and verification.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use tripdata_mirror::batch;
use tripdata_mirror::config::Config;
use tripdata_mirror::download::{Downloader, ReleaseSource};
use tripdata_mirror::store::{ObjectStore, S3Store};
use tripdata_mirror::transfer::{RetryPolicy, TransferTask};

/// Tripdata Mirror - mirror trip-data releases into object storage
#[derive(Parser, Debug)]
#[command(name = "tripdata-mirror")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Tripdata Mirror v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::load(&args.config)?;
    info!("Loaded configuration from {:?}", args.config);

    let store: Arc<dyn ObjectStore> = Arc::new(S3Store::new(&config.store).await?);
    store.ensure_bucket(&config.store.bucket).await?;

    let items = config.source.items();
    info!(total = items.len(), "files to process");

    // Download phase
    let downloader = Arc::new(Downloader::new(&config.source.download_dir)?);
    let source = ReleaseSource::new(&config.source.base_url);
    let downloaded = batch::download_all(
        downloader,
        source,
        items,
        config.transfer.workers,
    )
    .await;

    // Upload phase
    let tasks: Vec<TransferTask> = downloaded
        .into_iter()
        .map(|(item, path)| {
            TransferTask::new(
                path,
                config.store.bucket.clone(),
                item.file_name(),
                config.transfer.chunk_size,
            )
        })
        .collect();

    let policy = RetryPolicy::new(
        config.transfer.max_attempts,
        Duration::from_secs(config.transfer.retry_delay_secs),
    );
    let report = batch::upload_all(store, tasks, policy, config.transfer.workers).await;
    report.log_summary();

    info!("All files processed");

    Ok(())
}
