use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use geopoi_core::config::CacheSettings;
use geopoi_core::traits::CacheStore;
use geopoi_core::Result;

use crate::key::key_prefix;
use crate::writer::CacheWriter;

/// Cache-aside over a [`CacheStore`] holding JSON payloads.
///
/// A read error, a read timeout and an undecodable payload all count as a
/// miss. Concurrent misses on one key may each run `compute`; there is no
/// per-key locking.
pub struct CacheAside {
    store: Arc<dyn CacheStore>,
    writer: CacheWriter,
    read_timeout: Duration,
}

impl CacheAside {
    pub fn new(store: Arc<dyn CacheStore>, settings: &CacheSettings) -> Self {
        let writer = CacheWriter::spawn(store.clone(), settings.write_queue_capacity, settings.shutdown_timeout());
        Self { store, writer, read_timeout: settings.read_timeout() }
    }

    pub fn writer(&self) -> &CacheWriter { &self.writer }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = match tokio::time::timeout(self.read_timeout, self.store.get(key)).await {
            Ok(Ok(Some(bytes))) => bytes,
            Ok(Ok(None)) => {
                tracing::trace!(key_prefix = key_prefix(key), "cache miss");
                return None;
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, key_prefix = key_prefix(key), "cache read failed");
                return None;
            }
            Err(_) => {
                tracing::warn!(key_prefix = key_prefix(key), "cache read timed out");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                tracing::trace!(key_prefix = key_prefix(key), "cache hit");
                Some(value)
            }
            Err(e) => {
                tracing::warn!(error = %e, key_prefix = key_prefix(key), "cache payload decode failed");
                None
            }
        }
    }

    /// Write through synchronously.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        self.store.set(key, serde_json::to_vec(value)?, ttl).await
    }

    pub async fn invalidate(&self, key: &str) -> Result<()> { self.store.delete(key).await }

    /// Return the cached value for `key`, or run `compute`, queue the
    /// write-back and return the value as a cache hit would have produced it
    /// (serialized and decoded again, so skipped fields are reset).
    pub async fn get_or_compute<T, F, Fut>(&self, key: &str, ttl: Duration, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(hit) = self.get(key).await {
            return Ok(hit);
        }
        let value = compute().await?;
        let bytes = serde_json::to_vec(&value)?;
        let normalized = serde_json::from_slice(&bytes)?;
        self.writer.submit(key.to_string(), bytes, ttl);
        Ok(normalized)
    }

    pub async fn shutdown(&self) { self.writer.shutdown().await }
}
