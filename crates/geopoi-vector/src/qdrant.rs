//! Qdrant implementation of [`VectorIndex`].
//!
//! Points are keyed by the POI UUID and carry `name`, `category`, `lat`,
//! `lng` and `popularity` as payload. Distance is cosine.

use std::time::Duration;

use async_trait::async_trait;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, ScoredPoint, SearchPointsBuilder,
    UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use uuid::Uuid;

use geopoi_core::config::QdrantSettings;
use geopoi_core::traits::VectorIndex;
use geopoi_core::types::{VectorFilter, VectorMatch, VectorPoint};
use geopoi_core::{Error, Result};

use crate::filter::to_qdrant_filter;
use crate::schema::{FIELD_CATEGORY, FIELD_LAT, FIELD_LNG, FIELD_NAME, FIELD_POPULARITY};

fn vector_err(e: qdrant_client::QdrantError) -> Error { Error::Vector(e.to_string()) }

fn point_payload(point: &VectorPoint) -> Payload {
    let mut payload = Payload::new();
    payload.insert(FIELD_NAME, point.name.clone());
    payload.insert(FIELD_CATEGORY, point.category.clone());
    payload.insert(FIELD_LAT, point.lat);
    payload.insert(FIELD_LNG, point.lng);
    payload.insert(FIELD_POPULARITY, point.popularity);
    payload
}

/// Hits whose id is not a UUID were not written by this crate; skip them.
fn to_match(point: ScoredPoint) -> Option<VectorMatch> {
    let id = match point.id?.point_id_options? {
        PointIdOptions::Uuid(raw) => Uuid::parse_str(&raw).ok()?,
        PointIdOptions::Num(_) => return None,
    };
    Some(VectorMatch { id, score: point.score })
}

pub struct QdrantPoiIndex {
    client: Qdrant,
    collection: String,
}

impl QdrantPoiIndex {
    pub fn connect(settings: &QdrantSettings) -> Result<Self> {
        let client = Qdrant::from_url(&settings.url)
            .api_key(settings.api_key.clone())
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .map_err(vector_err)?;
        Ok(Self { client, collection: settings.collection.clone() })
    }
}

#[async_trait]
impl VectorIndex for QdrantPoiIndex {
    async fn search(&self, vector: &[f32], limit: usize, filter: &VectorFilter) -> Result<Vec<VectorMatch>> {
        let mut request =
            SearchPointsBuilder::new(self.collection.as_str(), vector.to_vec(), limit as u64).with_payload(false);
        if let Some(filter) = to_qdrant_filter(filter) {
            request = request.filter(filter);
        }
        let response = self.client.search_points(request).await.map_err(vector_err)?;
        Ok(response.result.into_iter().filter_map(to_match).collect())
    }

    async fn upsert(&self, points: Vec<VectorPoint>) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }
        let points: Vec<PointStruct> = points
            .into_iter()
            .map(|p| {
                let payload = point_payload(&p);
                PointStruct::new(p.id.to_string(), p.vector, payload)
            })
            .collect();
        self.client
            .upsert_points(UpsertPointsBuilder::new(self.collection.as_str(), points).wait(true))
            .await
            .map_err(vector_err)?;
        Ok(())
    }

    async fn ensure_collection(&self, dim: usize) -> Result<()> {
        if self.client.collection_exists(self.collection.as_str()).await.map_err(vector_err)? {
            return Ok(());
        }
        tracing::info!(collection = %self.collection, dim, "creating vector collection");
        self.client
            .create_collection(
                CreateCollectionBuilder::new(self.collection.as_str())
                    .vectors_config(VectorParamsBuilder::new(dim as u64, Distance::Cosine)),
            )
            .await
            .map_err(vector_err)?;
        Ok(())
    }

    async fn health(&self) -> Result<()> {
        self.client.health_check().await.map_err(vector_err)?;
        Ok(())
    }
}
