//! The one ordering rule shared by every structured search backend:
//! nearest first when a center is given, most popular first otherwise.

use crate::geo::haversine_m;
use crate::types::{Poi, SearchFilters};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    DistanceAsc,
    PopularityDesc,
}

impl SortOrder {
    pub fn for_filters(filters: &SearchFilters) -> Self {
        if filters.center.is_some() { SortOrder::DistanceAsc } else { SortOrder::PopularityDesc }
    }

    /// `ORDER BY` clause for the SQL builder; `distance` is the projected column.
    pub fn sql(self) -> &'static str {
        match self {
            SortOrder::DistanceAsc => " ORDER BY distance ASC",
            SortOrder::PopularityDesc => " ORDER BY popularity_score DESC",
        }
    }
}

/// Sort in place, filling `distance_m` first when a center is present.
/// The sort is stable, so equal keys keep their incoming order.
pub fn sort_pois(pois: &mut [Poi], filters: &SearchFilters) {
    if let Some(center) = filters.center {
        for poi in pois.iter_mut() {
            poi.distance_m = Some(haversine_m(center, poi.location()));
        }
    }
    match SortOrder::for_filters(filters) {
        SortOrder::DistanceAsc => pois.sort_by(|a, b| {
            a.distance_m.unwrap_or(f64::MAX).total_cmp(&b.distance_m.unwrap_or(f64::MAX))
        }),
        SortOrder::PopularityDesc => pois.sort_by(|a, b| b.popularity_score.total_cmp(&a.popularity_score)),
    }
}
