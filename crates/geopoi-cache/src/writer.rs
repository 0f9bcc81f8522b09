//! Bounded background queue for cache population.
//!
//! One worker task drains the queue in order. A full queue drops the write;
//! a failed write is logged and forgotten.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use geopoi_core::traits::CacheStore;

use crate::key::key_prefix;

enum Job {
    Write { key: String, value: Vec<u8>, ttl: Duration },
    Flush(oneshot::Sender<()>),
}

pub struct CacheWriter {
    tx: RwLock<Option<mpsc::Sender<Job>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    shutdown_timeout: Duration,
}

impl CacheWriter {
    /// Spawns the worker on the current tokio runtime.
    pub fn spawn(store: Arc<dyn CacheStore>, capacity: usize, shutdown_timeout: Duration) -> Self {
        let (tx, mut rx) = mpsc::channel::<Job>(capacity.max(1));
        let worker = tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                match job {
                    Job::Write { key, value, ttl } => {
                        if let Err(e) = store.set(&key, value, ttl).await {
                            tracing::debug!(error = %e, key_prefix = key_prefix(&key), "cache write failed");
                        }
                    }
                    Job::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
        });
        Self { tx: RwLock::new(Some(tx)), worker: Mutex::new(Some(worker)), shutdown_timeout }
    }

    /// Enqueue a write without waiting. Returns false when it was dropped.
    pub fn submit(&self, key: String, value: Vec<u8>, ttl: Duration) -> bool {
        let guard = self.tx.read();
        let Some(tx) = guard.as_ref() else {
            tracing::debug!(key_prefix = key_prefix(&key), "cache writer closed; dropping write");
            return false;
        };
        match tx.try_send(Job::Write { key, value, ttl }) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(Job::Write { key, .. })) => {
                tracing::debug!(key_prefix = key_prefix(&key), "cache write queue full; dropping write");
                false
            }
            Err(_) => false,
        }
    }

    /// Resolves once every write queued before this call has been attempted.
    pub async fn flush(&self) {
        let tx = self.tx.read().clone();
        let Some(tx) = tx else { return };
        let (done, wait) = oneshot::channel();
        if tx.send(Job::Flush(done)).await.is_ok() {
            let _ = wait.await;
        }
    }

    /// Close the queue and wait for the worker to drain it, bounded by the
    /// shutdown timeout. Later submits are dropped.
    pub async fn shutdown(&self) {
        drop(self.tx.write().take());
        let worker = self.worker.lock().take();
        let Some(worker) = worker else { return };
        match tokio::time::timeout(self.shutdown_timeout, worker).await {
            Ok(_) => tracing::debug!("cache writer drained"),
            Err(_) => tracing::warn!(
                timeout_ms = self.shutdown_timeout.as_millis() as u64,
                "cache writer did not drain in time; pending writes dropped"
            ),
        }
    }
}
