//! The search facade: normalize, pick a retrieval path, merge, stamp.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use geopoi_core::config::SearchSettings;
use geopoi_core::deadline::with_deadline;
use geopoi_core::traits::{PoiSearch, PoiStore};
use geopoi_core::types::{Category, Poi, PoiId, SearchFilters, SearchResult};
use geopoi_core::{Error, Result};
use geopoi_vector::VectorSearchEngine;

use crate::merge::{hydrate, supplement};
use crate::normalize::{NormalizedQuery, QueryNormalizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Relational store only.
    StructuredOnly,
    /// Vector store first, relational store for fallback and supplement.
    Hybrid,
}

pub struct SearchOrchestrator {
    store: Arc<dyn PoiStore>,
    semantic: Option<VectorSearchEngine>,
    normalizer: QueryNormalizer,
    settings: SearchSettings,
}

impl SearchOrchestrator {
    pub fn structured(store: Arc<dyn PoiStore>, normalizer: QueryNormalizer) -> Self {
        Self { store, semantic: None, normalizer, settings: SearchSettings::default() }
    }

    pub fn hybrid(store: Arc<dyn PoiStore>, semantic: VectorSearchEngine, normalizer: QueryNormalizer) -> Self {
        Self { store, semantic: Some(semantic), normalizer, settings: SearchSettings::default() }
    }

    /// Fix the strategy for the life of the process: hybrid only when both
    /// the embedding service and the vector store answer their health probe.
    pub async fn detect(
        store: Arc<dyn PoiStore>,
        semantic: Option<VectorSearchEngine>,
        normalizer: QueryNormalizer,
    ) -> Self {
        let Some(engine) = semantic else {
            tracing::info!("semantic search disabled; using structured search");
            return Self::structured(store, normalizer);
        };
        match engine.health().await {
            Ok(()) => {
                tracing::info!("semantic search available; using hybrid search");
                Self::hybrid(store, engine, normalizer)
            }
            Err(e) => {
                tracing::warn!(error = %e, "semantic search unavailable; degrading to structured search");
                Self::structured(store, normalizer)
            }
        }
    }

    pub fn with_settings(mut self, settings: SearchSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn strategy(&self) -> Strategy {
        if self.semantic.is_some() { Strategy::Hybrid } else { Strategy::StructuredOnly }
    }

    pub fn store(&self) -> &Arc<dyn PoiStore> { &self.store }

    pub fn semantic(&self) -> Option<&VectorSearchEngine> { self.semantic.as_ref() }

    async fn structured_search(&self, normalized: &NormalizedQuery, filters: &SearchFilters) -> Result<SearchResult> {
        if normalized.residual.is_empty() {
            self.store.search(filters).await
        } else {
            self.store.search_by_text(&normalized.residual, filters).await
        }
    }

    async fn hybrid_search(
        &self,
        engine: &VectorSearchEngine,
        query: &str,
        normalized: &NormalizedQuery,
        filters: &SearchFilters,
    ) -> Result<SearchResult> {
        let mut hits = match engine.semantic_search(query, filters).await {
            Ok(hits) => hits,
            Err(e) if e.is_semantic() => {
                tracing::warn!(error = %e, "semantic search failed; falling back to structured search");
                return self.structured_search(normalized, filters).await;
            }
            Err(e) => return Err(e),
        };
        if hits.is_empty() {
            if self.settings.fallback_on_empty_semantic {
                tracing::debug!("no semantic hits; falling back to structured search");
                return self.structured_search(normalized, filters).await;
            }
            return Ok(SearchResult::default());
        }
        hits.truncate(self.settings.max_merged_results);

        let mut pois = hydrate(self.store.as_ref(), &hits).await?;
        if pois.len() < self.settings.supplement_threshold {
            match self.store.search_by_text(query, filters).await {
                Ok(extra) => {
                    let added = supplement(&mut pois, extra.pois, self.settings.max_merged_results);
                    tracing::debug!(added, "supplemented semantic hits with text matches");
                }
                Err(e) => tracing::warn!(error = %e, "supplementary text search failed"),
            }
        }
        Ok(SearchResult::from_pois(pois))
    }

    async fn run(&self, query: &str, mut filters: SearchFilters) -> Result<SearchResult> {
        filters.limit = filters.limit_or(self.settings.default_limit);
        let normalized = self.normalizer.apply(query, &mut filters);
        match &self.semantic {
            Some(engine) if !query.trim().is_empty() => self.hybrid_search(engine, query, &normalized, &filters).await,
            _ => self.structured_search(&normalized, &filters).await,
        }
    }
}

#[async_trait]
impl PoiSearch for SearchOrchestrator {
    async fn search(&self, query: &str, filters: SearchFilters) -> Result<SearchResult> {
        let started = Instant::now();
        let mut result = with_deadline(self.settings.request_timeout(), self.run(query, filters)).await?;
        result.query = query.to_string();
        result.took_ms = started.elapsed().as_millis() as u64;
        Ok(result)
    }

    async fn get_by_id(&self, id: PoiId) -> Result<Poi> {
        let lookup = self.store.get_by_id(id);
        with_deadline(self.settings.request_timeout(), lookup)
            .await?
            .ok_or_else(|| Error::NotFound(format!("poi {id}")))
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        with_deadline(self.settings.request_timeout(), self.store.categories()).await
    }
}
