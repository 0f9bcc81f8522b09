use std::time::{Duration, Instant};

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::debug;

use geopoi_core::category::build_category_tree;
use geopoi_core::config::PostgresSettings;
use geopoi_core::traits::PoiStore;
use geopoi_core::types::{Category, Poi, PoiId, SearchFilters, SearchResult, DEFAULT_PAGE_SIZE};
use geopoi_core::{Error, Result};

use crate::query::{build_search, Param, PoiQuery, POI_COLUMNS};
use crate::row::{CategoryRow, PoiRow};

const CATEGORIES_SQL: &str = "SELECT id, name_ru, COALESCE(name_en, '') AS name_en, \
NULLIF(parent_id, '') AS parent_id, COALESCE(icon, '') AS icon, \
COALESCE(osm_tags::text, '[]') AS osm_tags \
FROM categories ORDER BY parent_id NULLS FIRST, name_ru";

pub(crate) fn store_err(e: sqlx::Error) -> Error { Error::Store(e.to_string()) }

/// `PoiStore` over a pooled PostgreSQL/PostGIS connection.
#[derive(Clone)]
pub struct PgPoiStore {
    pool: PgPool,
    default_limit: usize,
}

impl PgPoiStore {
    pub fn new(pool: PgPool) -> Self { Self { pool, default_limit: DEFAULT_PAGE_SIZE } }

    /// Page size for requests that leave `limit` at zero.
    pub fn with_default_limit(mut self, default_limit: usize) -> Self {
        self.default_limit = default_limit;
        self
    }

    pub async fn connect(settings: &PostgresSettings) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .max_lifetime(Some(Duration::from_secs(settings.max_lifetime_secs)))
            .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
            .connect(&settings.url)
            .await
            .map_err(store_err)?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool { &self.pool }

    async fn fetch(&self, query: PoiQuery) -> Result<SearchResult> {
        let started = Instant::now();
        let mut stmt = sqlx::query_as::<_, PoiRow>(query.sql());
        for param in query.params() {
            stmt = match param {
                Param::Float(v) => stmt.bind(*v),
                Param::Int(v) => stmt.bind(*v),
                Param::Text(v) => stmt.bind(v.as_str()),
                Param::TextArray(v) => stmt.bind(v.clone()),
            };
        }
        let rows = stmt.fetch_all(&self.pool).await.map_err(store_err)?;
        let pois: Vec<Poi> = rows.into_iter().map(Poi::from).collect();
        debug!(rows = pois.len(), elapsed_ms = started.elapsed().as_millis() as u64, "poi query");
        Ok(SearchResult::from_pois(pois))
    }
}

#[async_trait]
impl PoiStore for PgPoiStore {
    async fn search(&self, filters: &SearchFilters) -> Result<SearchResult> {
        self.fetch(build_search(filters, None, self.default_limit)).await
    }

    async fn search_by_text(&self, text: &str, filters: &SearchFilters) -> Result<SearchResult> {
        let mut result = self.fetch(build_search(filters, Some(text), self.default_limit)).await?;
        result.query = text.to_string();
        Ok(result)
    }

    async fn get_by_id(&self, id: PoiId) -> Result<Option<Poi>> {
        let sql = format!("SELECT {POI_COLUMNS} FROM poi WHERE id = $1");
        let row = sqlx::query_as::<_, PoiRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(row.map(Poi::from))
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(CATEGORIES_SQL)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(build_category_tree(rows.into_iter().map(Category::from).collect()))
    }

    async fn scan(&self, after: Option<PoiId>, limit: usize) -> Result<Vec<Poi>> {
        let sql = format!("SELECT {POI_COLUMNS} FROM poi WHERE ($1::uuid IS NULL OR id > $1) ORDER BY id LIMIT $2");
        let rows = sqlx::query_as::<_, PoiRow>(&sql)
            .bind(after)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(rows.into_iter().map(Poi::from).collect())
    }
}
