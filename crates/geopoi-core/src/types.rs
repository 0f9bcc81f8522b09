//! Domain types shared by the structured, vector and cache layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type PoiId = Uuid;

/// Page size used whenever a caller leaves `limit` at zero.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// A WGS-84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self { Self { lat, lng } }
}

/// A point of interest as stored in the relational store.
///
/// `popularity_score` is a ranking signal. The semantic path overwrites it on
/// its in-memory copy with the similarity score; that value is never written
/// back. `distance_m` is filled only when a search had a center and is never
/// serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub id: PoiId,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub short_description: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub address: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subcategory: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub historical_period: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_built: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_destroyed: Option<i32>,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub osm_id: Option<i64>,
    pub popularity_score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub distance_m: Option<f64>,
}

impl Poi {
    pub fn location(&self) -> Coordinate { Coordinate::new(self.lat, self.lng) }

    /// Text fed to the embedding service when indexing: name plus description.
    pub fn embedding_text(&self) -> String {
        if self.description.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.description)
        }
    }
}

/// A node of the category tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name_ru: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name_en: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub osm_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Category>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// OR-matched against `Poi::category`.
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub center: Option<Coordinate>,
    #[serde(default)]
    pub radius_km: f64,
    /// Passed through untouched.
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

impl SearchFilters {
    /// `limit` with zero replaced by the default page size.
    pub fn effective_limit(&self) -> usize { self.limit_or(DEFAULT_PAGE_SIZE) }

    /// `limit` with zero replaced by a configured page size.
    pub fn limit_or(&self, default_limit: usize) -> usize {
        if self.limit == 0 { default_limit } else { self.limit }
    }

    /// Center and radius, only when both are usable for a containment predicate.
    pub fn radius(&self) -> Option<(Coordinate, f64)> {
        match self.center {
            Some(center) if self.radius_km > 0.0 => Some((center, self.radius_km)),
            _ => None,
        }
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    pub fn near(mut self, center: Coordinate, radius_km: f64) -> Self {
        self.center = Some(center);
        self.radius_km = radius_km;
        self
    }
}

/// One page of search output. `total` counts `pois`, not all matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub pois: Vec<Poi>,
    pub total: usize,
    pub query: String,
    pub took_ms: u64,
}

impl SearchResult {
    pub fn from_pois(pois: Vec<Poi>) -> Self {
        let total = pois.len();
        Self { pois, total, ..Default::default() }
    }
}

/// A vector-store hit. `score` is similarity: higher is better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorMatch {
    pub id: PoiId,
    pub score: f32,
}

/// Latitude/longitude box used by geo-bounded similarity queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    pub fn contains(&self, c: Coordinate) -> bool {
        c.lat >= self.min_lat && c.lat <= self.max_lat && c.lng >= self.min_lng && c.lng <= self.max_lng
    }
}

/// Payload filter applied to a similarity query.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum VectorFilter {
    #[default]
    None,
    Categories(Vec<String>),
    Bounds(BoundingBox),
}

/// A vector plus the payload stored alongside it.
#[derive(Debug, Clone)]
pub struct VectorPoint {
    pub id: PoiId,
    pub vector: Vec<f32>,
    pub name: String,
    pub category: String,
    pub lat: f64,
    pub lng: f64,
    pub popularity: f64,
}

impl VectorPoint {
    pub fn from_poi(poi: &Poi, vector: Vec<f32>) -> Self {
        Self {
            id: poi.id,
            vector,
            name: poi.name.clone(),
            category: poi.category.clone(),
            lat: poi.lat,
            lng: poi.lng,
            popularity: poi.popularity_score,
        }
    }
}

/// What the remote embedding service reports about itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedderHealth {
    pub healthy: bool,
    pub model_name: String,
    pub vector_size: usize,
}
