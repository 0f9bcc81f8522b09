//! Great-circle distance and the degree approximation used for vector-store
//! bounding boxes.

use crate::types::{BoundingBox, Coordinate};

/// Mean Earth radius in meters (the sphere PostGIS geography distances approximate).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Kilometers per degree used to turn a radius into a lat/lng delta.
pub const KM_PER_DEGREE: f64 = 111.0;

/// Haversine distance between two points in meters.
pub fn haversine_m(a: Coordinate, b: Coordinate) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlng = (b.lng - a.lng).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

pub fn km_to_degrees(radius_km: f64) -> f64 { radius_km / KM_PER_DEGREE }

/// Square box of `radius_km` around `center`, with the same delta on both axes.
pub fn bounding_box(center: Coordinate, radius_km: f64) -> BoundingBox {
    let delta = km_to_degrees(radius_km);
    BoundingBox {
        min_lat: center.lat - delta,
        max_lat: center.lat + delta,
        min_lng: center.lng - delta,
        max_lng: center.lng + delta,
    }
}
