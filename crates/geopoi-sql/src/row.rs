//! Row shapes returned by the PostGIS statements.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use geopoi_core::types::{Category, Poi};

#[derive(Debug, sqlx::FromRow)]
pub struct PoiRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub short_description: String,
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    pub category: String,
    pub subcategory: String,
    pub tags: Json<Vec<String>>,
    pub historical_period: String,
    pub year_built: Option<i32>,
    pub year_destroyed: Option<i32>,
    pub source: String,
    pub osm_id: Option<i64>,
    pub popularity_score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Present only when the statement projected a distance.
    #[sqlx(default)]
    pub distance: Option<f64>,
}

impl From<PoiRow> for Poi {
    fn from(row: PoiRow) -> Self {
        Poi {
            id: row.id,
            name: row.name,
            description: row.description,
            short_description: row.short_description,
            lat: row.lat,
            lng: row.lng,
            address: row.address,
            category: row.category,
            subcategory: row.subcategory,
            tags: row.tags.0,
            historical_period: row.historical_period,
            year_built: row.year_built,
            year_destroyed: row.year_destroyed,
            source: row.source,
            osm_id: row.osm_id,
            popularity_score: row.popularity_score,
            created_at: row.created_at,
            updated_at: row.updated_at,
            distance_m: row.distance,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: String,
    pub name_ru: String,
    pub name_en: String,
    pub parent_id: Option<String>,
    pub icon: String,
    pub osm_tags: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        // Malformed tag arrays degrade to an empty list.
        let osm_tags = serde_json::from_str(&row.osm_tags).unwrap_or_default();
        Category {
            id: row.id,
            name_ru: row.name_ru,
            name_en: row.name_en,
            parent_id: row.parent_id,
            icon: row.icon,
            osm_tags,
            children: Vec::new(),
        }
    }
}
