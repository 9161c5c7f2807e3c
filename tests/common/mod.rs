//! Common test infrastructure
//!
//! Provides a scriptable in-memory object store for exercising the uploader
//! and the batch pool without a real S3 backend.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tripdata_mirror::store::{ObjectStore, StoreError};

/// Scripted answer for a single existence check
#[derive(Debug, Clone, Copy)]
pub enum ExistsResponse {
    Present,
    Absent,
    Unreachable,
}

/// In-memory object store with scriptable failures
///
/// Existence checks consume `exists_script` first; once the script is
/// exhausted, keys in `absent_keys` read as absent and everything else
/// follows `default_exists`.
pub struct FakeStore {
    pub puts: Mutex<Vec<(String, PathBuf)>>,
    pub exists_calls: AtomicUsize,
    pub buckets_ensured: Mutex<Vec<String>>,
    exists_script: Mutex<VecDeque<ExistsResponse>>,
    absent_keys: Mutex<HashSet<String>>,
    default_exists: ExistsResponse,
    failing_puts: AtomicUsize,
    put_delay: Option<Duration>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeStore {
    /// Store where every upload lands and verifies
    pub fn new() -> Self {
        Self {
            puts: Mutex::new(Vec::new()),
            exists_calls: AtomicUsize::new(0),
            buckets_ensured: Mutex::new(Vec::new()),
            exists_script: Mutex::new(VecDeque::new()),
            absent_keys: Mutex::new(HashSet::new()),
            default_exists: ExistsResponse::Present,
            failing_puts: AtomicUsize::new(0),
            put_delay: None,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Script the next existence check responses, in order
    pub fn with_exists_script(mut self, script: Vec<ExistsResponse>) -> Self {
        self.exists_script = Mutex::new(script.into());
        self
    }

    /// Default response once the script is exhausted
    pub fn with_default_exists(mut self, response: ExistsResponse) -> Self {
        self.default_exists = response;
        self
    }

    /// Make a specific key always read as absent
    pub fn with_absent_key(self, key: &str) -> Self {
        self.absent_keys.lock().unwrap().insert(key.to_string());
        self
    }

    /// Fail the first `n` put calls with a transfer error
    pub fn with_failing_puts(self, n: usize) -> Self {
        self.failing_puts.store(n, Ordering::SeqCst);
        self
    }

    /// Hold each put open for `delay`, for concurrency measurements
    pub fn with_put_delay(mut self, delay: Duration) -> Self {
        self.put_delay = Some(delay);
        self
    }

    pub fn put_count(&self) -> usize {
        self.puts.lock().unwrap().len()
    }

    pub fn exists_count(&self) -> usize {
        self.exists_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn put_object(
        &self,
        _bucket: &str,
        key: &str,
        source: &Path,
        _chunk_size: usize,
    ) -> Result<(), StoreError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.put_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let remaining = self.failing_puts.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_puts.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::RequestError("injected transfer failure".into()));
        }

        self.puts
            .lock()
            .unwrap()
            .push((key.to_string(), source.to_path_buf()));
        Ok(())
    }

    async fn object_exists(&self, _bucket: &str, key: &str) -> Result<bool, StoreError> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);

        let scripted = self.exists_script.lock().unwrap().pop_front();
        let response = match scripted {
            Some(response) => response,
            None if self.absent_keys.lock().unwrap().contains(key) => ExistsResponse::Absent,
            None => self.default_exists,
        };

        match response {
            ExistsResponse::Present => Ok(true),
            ExistsResponse::Absent => Ok(false),
            ExistsResponse::Unreachable => {
                Err(StoreError::RequestError("injected store outage".into()))
            }
        }
    }

    async fn ensure_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        self.buckets_ensured.lock().unwrap().push(bucket.to_string());
        Ok(())
    }
}
