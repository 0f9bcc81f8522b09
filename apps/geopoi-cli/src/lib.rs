//! Process wiring: turn [`Settings`] into a ready [`PoiSearch`] facade.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

use std::sync::Arc;

use anyhow::{bail, Result};

use geopoi_cache::{CacheAside, CachedEmbedder, CachedSearch, MemoryCacheStore, PgCacheStore};
use geopoi_core::config::{CacheBackend, Settings};
use geopoi_core::traits::{CacheStore, Embedder, PoiSearch, PoiStore};
use geopoi_embed::get_default_embedder;
use geopoi_hybrid::{QueryNormalizer, SearchOrchestrator, Strategy};
use geopoi_sql::PgPoiStore;
use geopoi_vector::{QdrantPoiIndex, VectorSearchEngine};

pub struct App {
    pub search: Arc<dyn PoiSearch>,
    pub store: Arc<dyn PoiStore>,
    /// Uncached engine, for indexing.
    pub semantic: Option<VectorSearchEngine>,
    pub strategy: Strategy,
    aside: Option<Arc<CacheAside>>,
}

/// The embedding service and the collection must agree on dimension.
pub fn check_dimensions(settings: &Settings) -> Result<()> {
    if settings.embedding.enabled && settings.embedding.vector_size != settings.qdrant.vector_size {
        bail!(
            "embedding.vector_size ({}) differs from qdrant.vector_size ({})",
            settings.embedding.vector_size,
            settings.qdrant.vector_size
        );
    }
    Ok(())
}

async fn cache_store(settings: &Settings, pg: &PgPoiStore) -> Result<Arc<dyn CacheStore>> {
    let store: Arc<dyn CacheStore> = match settings.cache.backend {
        CacheBackend::Postgres => {
            let store = PgCacheStore::new(pg.pool().clone());
            store.ensure_schema().await?;
            let purged = store.purge_expired().await?;
            tracing::debug!(purged, "expired cache rows removed");
            Arc::new(store)
        }
        CacheBackend::Memory => Arc::new(MemoryCacheStore::new()),
    };
    Ok(store)
}

impl App {
    pub async fn build(settings: &Settings, use_cache: bool) -> Result<Self> {
        check_dimensions(settings)?;
        let pg = PgPoiStore::connect(&settings.postgres).await?.with_default_limit(settings.search.default_limit);

        let aside = if use_cache && settings.cache.enabled {
            let store = cache_store(settings, &pg).await?;
            Some(Arc::new(CacheAside::new(store, &settings.cache)))
        } else {
            None
        };
        let store: Arc<dyn PoiStore> = Arc::new(pg);

        let (semantic, query_engine) = if settings.embedding.enabled {
            let embedder = get_default_embedder(&settings.embedding)?;
            let index = Arc::new(QdrantPoiIndex::connect(&settings.qdrant)?);
            let query_embedder: Arc<dyn Embedder> = match &aside {
                Some(aside) => {
                    Arc::new(CachedEmbedder::new(embedder.clone(), aside.clone(), settings.cache.embedding_ttl()))
                }
                None => embedder.clone(),
            };
            (
                Some(VectorSearchEngine::new(embedder, index.clone())),
                Some(VectorSearchEngine::new(query_embedder, index)),
            )
        } else {
            (None, None)
        };

        let orchestrator =
            SearchOrchestrator::detect(store.clone(), query_engine, QueryNormalizer::new(settings.normalizer.clone()))
                .await
                .with_settings(settings.search.clone());
        let strategy = orchestrator.strategy();

        let search: Arc<dyn PoiSearch> = match &aside {
            Some(aside) => Arc::new(
                CachedSearch::new(orchestrator, aside.clone(), settings.cache.clone())
                    .with_default_limit(settings.search.default_limit),
            ),
            None => Arc::new(orchestrator),
        };
        Ok(Self { search, store, semantic, strategy, aside })
    }

    /// Drain queued cache writes.
    pub async fn shutdown(&self) {
        if let Some(aside) = &self.aside {
            aside.shutdown().await;
        }
    }
}
