//! Collection layout: one vector per POI id, keyed by the POI's UUID, with
//! a small payload used for filtering.

pub const FIELD_NAME: &str = "name";
pub const FIELD_CATEGORY: &str = "category";
pub const FIELD_LAT: &str = "lat";
pub const FIELD_LNG: &str = "lng";
pub const FIELD_POPULARITY: &str = "popularity";

/// Batch size used when embedding and upserting many POIs.
pub const INDEX_BATCH_SIZE: usize = 50;
