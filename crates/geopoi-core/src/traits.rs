use std::time::Duration;

use async_trait::async_trait;

use crate::types::{
    Category, EmbedderHealth, Poi, PoiId, SearchFilters, SearchResult, VectorFilter, VectorMatch,
    VectorPoint,
};
use crate::Result;

/// Turns text into fixed-dimension vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
    async fn health(&self) -> Result<EmbedderHealth>;
}

/// Structured geospatial/text search over the relational store.
#[async_trait]
pub trait PoiStore: Send + Sync {
    /// Filter-only search.
    async fn search(&self, filters: &SearchFilters) -> Result<SearchResult>;
    /// Case-insensitive substring match on name, description and address.
    async fn search_by_text(&self, text: &str, filters: &SearchFilters) -> Result<SearchResult>;
    /// Point lookup; `Ok(None)` when the id does not exist.
    async fn get_by_id(&self, id: PoiId) -> Result<Option<Poi>>;
    /// Root categories with their subtrees attached.
    async fn categories(&self) -> Result<Vec<Category>>;
    /// Keyset scan ordered by id, used for reindexing.
    async fn scan(&self, after: Option<PoiId>, limit: usize) -> Result<Vec<Poi>>;
}

/// Similarity search over per-POI embeddings.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Hits in the store's native order (descending similarity).
    async fn search(&self, vector: &[f32], limit: usize, filter: &VectorFilter) -> Result<Vec<VectorMatch>>;
    async fn upsert(&self, points: Vec<VectorPoint>) -> Result<()>;
    async fn ensure_collection(&self, dim: usize) -> Result<()>;
    async fn health(&self) -> Result<()>;
}

/// Key-value store holding opaque serialized blobs with a TTL.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
}

/// The public surface consumed by the transport layer.
#[async_trait]
pub trait PoiSearch: Send + Sync {
    async fn search(&self, query: &str, filters: SearchFilters) -> Result<SearchResult>;
    /// Fails with `Error::NotFound` for unknown ids.
    async fn get_by_id(&self, id: PoiId) -> Result<Poi>;
    async fn categories(&self) -> Result<Vec<Category>>;
}
