use qdrant_client::qdrant::{Condition, Filter, Range};

use geopoi_core::types::VectorFilter;

use crate::schema::{FIELD_CATEGORY, FIELD_LAT, FIELD_LNG};

/// Translate a payload filter into a Qdrant filter; `None` means unfiltered.
pub fn to_qdrant_filter(filter: &VectorFilter) -> Option<Filter> {
    match filter {
        VectorFilter::None => None,
        VectorFilter::Categories(categories) if categories.is_empty() => None,
        VectorFilter::Categories(categories) => Some(Filter::must([Condition::matches(
            FIELD_CATEGORY,
            categories.clone(),
        )])),
        VectorFilter::Bounds(bbox) => Some(Filter::must([
            Condition::range(
                FIELD_LAT,
                Range { gte: Some(bbox.min_lat), lte: Some(bbox.max_lat), ..Default::default() },
            ),
            Condition::range(
                FIELD_LNG,
                Range { gte: Some(bbox.min_lng), lte: Some(bbox.max_lng), ..Default::default() },
            ),
        ])),
    }
}
