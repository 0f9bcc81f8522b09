//! In-process [`VectorIndex`] with exact cosine scoring. Payload filters
//! behave like the Qdrant ones: category membership or an inclusive
//! lat/lng box.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use geopoi_core::traits::VectorIndex;
use geopoi_core::types::{Coordinate, PoiId, VectorFilter, VectorMatch, VectorPoint};
use geopoi_core::{Error, Result};

#[derive(Default)]
pub struct MemoryVectorIndex {
    points: RwLock<HashMap<PoiId, VectorPoint>>,
    dim: RwLock<Option<usize>>,
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 { 0.0 } else { dot / (na * nb) }
}

fn admits(filter: &VectorFilter, point: &VectorPoint) -> bool {
    match filter {
        VectorFilter::None => true,
        VectorFilter::Categories(c) => c.is_empty() || c.contains(&point.category),
        VectorFilter::Bounds(bbox) => bbox.contains(Coordinate::new(point.lat, point.lng)),
    }
}

impl MemoryVectorIndex {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.points.read().len() }

    pub fn is_empty(&self) -> bool { self.points.read().is_empty() }

    pub fn contains(&self, id: PoiId) -> bool { self.points.read().contains_key(&id) }
}

#[async_trait]
impl VectorIndex for MemoryVectorIndex {
    async fn search(&self, vector: &[f32], limit: usize, filter: &VectorFilter) -> Result<Vec<VectorMatch>> {
        let points = self.points.read();
        let mut hits: Vec<VectorMatch> = points
            .values()
            .filter(|p| admits(filter, p))
            .map(|p| VectorMatch { id: p.id, score: cosine(vector, &p.vector) })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.id.cmp(&b.id)));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn upsert(&self, points: Vec<VectorPoint>) -> Result<()> {
        if let Some(dim) = *self.dim.read() {
            if let Some(bad) = points.iter().find(|p| p.vector.len() != dim) {
                return Err(Error::Vector(format!(
                    "point {} has {} dimensions, collection expects {dim}",
                    bad.id,
                    bad.vector.len()
                )));
            }
        }
        let mut map = self.points.write();
        for p in points {
            map.insert(p.id, p);
        }
        Ok(())
    }

    async fn ensure_collection(&self, dim: usize) -> Result<()> {
        let mut current = self.dim.write();
        if current.is_none() {
            *current = Some(dim);
        }
        Ok(())
    }

    async fn health(&self) -> Result<()> { Ok(()) }
}
