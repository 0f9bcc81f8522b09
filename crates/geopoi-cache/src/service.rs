use std::sync::Arc;

use async_trait::async_trait;

use geopoi_core::config::CacheSettings;
use geopoi_core::traits::PoiSearch;
use geopoi_core::types::{Category, Poi, PoiId, SearchFilters, SearchResult, DEFAULT_PAGE_SIZE};
use geopoi_core::Result;

use crate::aside::CacheAside;
use crate::key::{categories_key, poi_key, search_key};

/// [`PoiSearch`] with every operation behind [`CacheAside`]. Errors are
/// never cached.
pub struct CachedSearch<S> {
    inner: S,
    aside: Arc<CacheAside>,
    settings: CacheSettings,
    default_limit: usize,
}

impl<S: PoiSearch> CachedSearch<S> {
    pub fn new(inner: S, aside: Arc<CacheAside>, settings: CacheSettings) -> Self {
        Self { inner, aside, settings, default_limit: DEFAULT_PAGE_SIZE }
    }

    /// Must match the page size `inner` applies when `limit` is zero.
    pub fn with_default_limit(mut self, default_limit: usize) -> Self {
        self.default_limit = default_limit;
        self
    }

    pub fn inner(&self) -> &S { &self.inner }
}

#[async_trait]
impl<S: PoiSearch> PoiSearch for CachedSearch<S> {
    async fn search(&self, query: &str, filters: SearchFilters) -> Result<SearchResult> {
        let key = search_key(query, &filters, self.default_limit);
        self.aside
            .get_or_compute(&key, self.settings.search_ttl(), || self.inner.search(query, filters))
            .await
    }

    async fn get_by_id(&self, id: PoiId) -> Result<Poi> {
        self.aside.get_or_compute(&poi_key(id), self.settings.poi_ttl(), || self.inner.get_by_id(id)).await
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        self.aside
            .get_or_compute(&categories_key(), self.settings.categories_ttl(), || self.inner.categories())
            .await
    }
}
