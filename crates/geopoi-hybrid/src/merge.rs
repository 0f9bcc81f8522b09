use std::collections::HashSet;

use futures::future::try_join_all;

use geopoi_core::traits::PoiStore;
use geopoi_core::types::{Poi, VectorMatch};
use geopoi_core::Result;

/// Resolve hits to POIs in hit order, replacing `popularity_score` with the
/// similarity score. Ids missing from the store are dropped. Lookups run
/// concurrently; any store error fails the whole call.
pub async fn hydrate(store: &dyn PoiStore, hits: &[VectorMatch]) -> Result<Vec<Poi>> {
    let found = try_join_all(hits.iter().map(|hit| store.get_by_id(hit.id))).await?;
    Ok(hits
        .iter()
        .zip(found)
        .filter_map(|(hit, poi)| match poi {
            Some(mut poi) => {
                poi.popularity_score = f64::from(hit.score);
                Some(poi)
            }
            None => {
                tracing::debug!(id = %hit.id, "semantic hit missing from store; dropped");
                None
            }
        })
        .collect())
}

/// Append `extra` items not already present until `pois` holds `cap`
/// entries. Returns how many were appended.
pub fn supplement(pois: &mut Vec<Poi>, extra: Vec<Poi>, cap: usize) -> usize {
    let mut seen: HashSet<_> = pois.iter().map(|p| p.id).collect();
    let before = pois.len();
    for poi in extra {
        if pois.len() >= cap {
            break;
        }
        if seen.insert(poi.id) {
            pois.push(poi);
        }
    }
    pois.len() - before
}
