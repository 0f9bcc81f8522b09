use std::sync::Arc;

use geopoi_core::geo::bounding_box;
use geopoi_core::traits::{Embedder, VectorIndex};
use geopoi_core::types::{Poi, SearchFilters, VectorFilter, VectorMatch, VectorPoint};
use geopoi_core::{Error, Result};

use crate::schema::INDEX_BATCH_SIZE;

/// Embeds queries and POIs and talks to the vector store.
#[derive(Clone)]
pub struct VectorSearchEngine {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

/// Geo box when a usable radius is present, otherwise category membership.
pub fn filter_for(filters: &SearchFilters) -> VectorFilter {
    match filters.radius() {
        Some((center, radius_km)) => VectorFilter::Bounds(bounding_box(center, radius_km)),
        None if !filters.categories.is_empty() => VectorFilter::Categories(filters.categories.clone()),
        None => VectorFilter::None,
    }
}

impl VectorSearchEngine {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self { Self { embedder, index } }

    pub fn embedder(&self) -> &Arc<dyn Embedder> { &self.embedder }

    pub fn index(&self) -> &Arc<dyn VectorIndex> { &self.index }

    /// Similarity hits for `query`, best first. Scores are not comparable
    /// across queries.
    pub async fn semantic_search(&self, query: &str, filters: &SearchFilters) -> Result<Vec<VectorMatch>> {
        let vector = self.embedder.embed(query).await?;
        let hits = self.index.search(&vector, filters.effective_limit(), &filter_for(filters)).await?;
        tracing::debug!(hits = hits.len(), "semantic search");
        Ok(hits)
    }

    /// Both the embedding service and the vector store must answer.
    pub async fn health(&self) -> Result<()> {
        let health = self.embedder.health().await?;
        tracing::debug!(model = %health.model_name, dim = health.vector_size, "embedding service healthy");
        self.index.health().await
    }

    pub async fn ensure_collection(&self) -> Result<()> { self.index.ensure_collection(self.embedder.dim()).await }

    pub async fn index_poi(&self, poi: &Poi) -> Result<()> {
        let vector = self.embedder.embed(&poi.embedding_text()).await?;
        self.index.upsert(vec![VectorPoint::from_poi(poi, vector)]).await
    }

    /// Embed and upsert in batches. POIs without a name are skipped; returns
    /// how many were written.
    pub async fn index_pois(&self, pois: &[Poi]) -> Result<usize> {
        let named: Vec<&Poi> = pois.iter().filter(|p| !p.name.is_empty()).collect();
        if named.len() < pois.len() {
            tracing::debug!(skipped = pois.len() - named.len(), "skipping unnamed POIs");
        }
        let mut written = 0;
        for batch in named.chunks(INDEX_BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|p| p.embedding_text()).collect();
            let vectors = self.embedder.embed_batch(&texts).await?;
            if vectors.len() != batch.len() {
                return Err(Error::Embedding(format!(
                    "got {} vectors for a batch of {}",
                    vectors.len(),
                    batch.len()
                )));
            }
            let points = batch.iter().zip(vectors).map(|(p, v)| VectorPoint::from_poi(p, v)).collect();
            self.index.upsert(points).await?;
            written += batch.len();
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geopoi_core::types::Coordinate;

    #[test]
    fn radius_takes_precedence_over_categories() {
        let filters = SearchFilters::default()
            .with_categories(vec!["religious".into()])
            .near(Coordinate::new(55.75, 37.61), 5.0);
        assert!(matches!(filter_for(&filters), VectorFilter::Bounds(_)));
    }

    #[test]
    fn center_without_radius_falls_back_to_categories() {
        let mut filters = SearchFilters::default().with_categories(vec!["military".into()]);
        filters.center = Some(Coordinate::new(55.75, 37.61));
        assert_eq!(filter_for(&filters), VectorFilter::Categories(vec!["military".into()]));
        assert_eq!(filter_for(&SearchFilters::default()), VectorFilter::None);
    }
}
