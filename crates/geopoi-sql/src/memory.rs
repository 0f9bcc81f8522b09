//! In-process `PoiStore` with the same predicate, ordering and paging rules
//! as the SQL statements. Distances are haversine rather than PostGIS
//! spheroid distances.

use async_trait::async_trait;
use parking_lot::RwLock;

use geopoi_core::category::build_category_tree;
use geopoi_core::geo::haversine_m;
use geopoi_core::ordering::sort_pois;
use geopoi_core::traits::PoiStore;
use geopoi_core::types::{Category, Poi, PoiId, SearchFilters, SearchResult, DEFAULT_PAGE_SIZE};
use geopoi_core::Result;

pub struct MemoryPoiStore {
    pois: RwLock<Vec<Poi>>,
    categories: RwLock<Vec<Category>>,
    default_limit: usize,
}

impl Default for MemoryPoiStore {
    fn default() -> Self {
        Self { pois: RwLock::new(Vec::new()), categories: RwLock::new(Vec::new()), default_limit: DEFAULT_PAGE_SIZE }
    }
}

impl MemoryPoiStore {
    pub fn new() -> Self { Self::default() }

    pub fn with_pois(pois: Vec<Poi>) -> Self {
        Self { pois: RwLock::new(pois), ..Default::default() }
    }

    /// Page size for requests that leave `limit` at zero.
    pub fn with_default_limit(mut self, default_limit: usize) -> Self {
        self.default_limit = default_limit;
        self
    }

    pub fn insert(&self, poi: Poi) { self.pois.write().push(poi); }

    /// Replace the flat category rows.
    pub fn set_categories(&self, rows: Vec<Category>) { *self.categories.write() = rows; }

    pub fn len(&self) -> usize { self.pois.read().len() }

    pub fn is_empty(&self) -> bool { self.pois.read().is_empty() }

    fn query(&self, filters: &SearchFilters, text: Option<&str>) -> SearchResult {
        let needle = text.map(str::to_lowercase);
        let mut hits: Vec<Poi> = self
            .pois
            .read()
            .iter()
            .filter(|p| match filters.radius() {
                Some((center, radius_km)) => haversine_m(center, p.location()) <= radius_km * 1000.0,
                None => true,
            })
            .filter(|p| filters.categories.is_empty() || filters.categories.contains(&p.category))
            .filter(|p| match &needle {
                Some(n) => [&p.name, &p.description, &p.address].iter().any(|f| f.to_lowercase().contains(n.as_str())),
                None => true,
            })
            .cloned()
            .collect();
        sort_pois(&mut hits, filters);
        let page = hits.into_iter().skip(filters.offset).take(filters.limit_or(self.default_limit)).collect();
        SearchResult::from_pois(page)
    }
}

#[async_trait]
impl PoiStore for MemoryPoiStore {
    async fn search(&self, filters: &SearchFilters) -> Result<SearchResult> { Ok(self.query(filters, None)) }

    async fn search_by_text(&self, text: &str, filters: &SearchFilters) -> Result<SearchResult> {
        let mut result = self.query(filters, Some(text));
        result.query = text.to_string();
        Ok(result)
    }

    async fn get_by_id(&self, id: PoiId) -> Result<Option<Poi>> {
        Ok(self.pois.read().iter().find(|p| p.id == id).cloned())
    }

    async fn categories(&self) -> Result<Vec<Category>> { Ok(build_category_tree(self.categories.read().clone())) }

    async fn scan(&self, after: Option<PoiId>, limit: usize) -> Result<Vec<Poi>> {
        let mut all: Vec<Poi> = self.pois.read().iter().filter(|p| after.map_or(true, |a| p.id > a)).cloned().collect();
        all.sort_by_key(|p| p.id);
        all.truncate(limit);
        Ok(all)
    }
}
