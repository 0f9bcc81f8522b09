use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use geopoi_core::traits::Embedder;
use geopoi_core::types::EmbedderHealth;
use geopoi_core::Result;

use crate::aside::CacheAside;
use crate::key::embedding_key;

/// Caches single-text embeddings. Batches go straight to the inner embedder.
pub struct CachedEmbedder {
    inner: Arc<dyn Embedder>,
    aside: Arc<CacheAside>,
    ttl: Duration,
}

impl CachedEmbedder {
    pub fn new(inner: Arc<dyn Embedder>, aside: Arc<CacheAside>, ttl: Duration) -> Self { Self { inner, aside, ttl } }
}

#[async_trait]
impl Embedder for CachedEmbedder {
    fn dim(&self) -> usize { self.inner.dim() }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.aside.get_or_compute(&embedding_key(text), self.ttl, || self.inner.embed(text)).await
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> { self.inner.embed_batch(texts).await }

    async fn health(&self) -> Result<EmbedderHealth> { self.inner.health().await }
}
