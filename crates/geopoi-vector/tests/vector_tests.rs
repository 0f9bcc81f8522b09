use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use geopoi_core::traits::VectorIndex;
use geopoi_core::types::{Coordinate, Poi, SearchFilters, VectorPoint};
use geopoi_embed::FakeEmbedder;
use geopoi_sql::MemoryPoiStore;
use geopoi_vector::writer::Reindexer;
use geopoi_vector::{MemoryVectorIndex, VectorSearchEngine};

fn poi(name: &str, description: &str, category: &str, lat: f64, lng: f64) -> Poi {
    let now = Utc::now();
    Poi {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: description.to_string(),
        short_description: String::new(),
        lat,
        lng,
        address: String::new(),
        category: category.to_string(),
        subcategory: String::new(),
        tags: vec![],
        historical_period: String::new(),
        year_built: None,
        year_destroyed: None,
        source: "osm".to_string(),
        osm_id: None,
        popularity_score: 0.5,
        created_at: now,
        updated_at: now,
        distance_m: None,
    }
}

fn engine() -> (VectorSearchEngine, Arc<MemoryVectorIndex>) {
    let index = Arc::new(MemoryVectorIndex::new());
    let engine = VectorSearchEngine::new(Arc::new(FakeEmbedder::new(384)), index.clone());
    (engine, index)
}

fn fixture() -> Vec<Poi> {
    vec![
        poi("Храм Христа Спасителя", "кафедральный собор на Волхонке", "religious", 55.7446, 37.6055),
        poi("Бункер-42", "подземный командный пункт на Таганке", "military", 55.7418, 37.6496),
        poi("Усадьба Царицыно", "дворцово-парковый ансамбль", "architecture", 55.6156, 37.6866),
        poi("Троице-Сергиева лавра", "монастырь в Сергиевом Посаде", "religious", 56.3105, 38.1300),
    ]
}

#[tokio::test]
async fn index_pois_skips_unnamed() {
    let (engine, index) = engine();
    let mut pois = fixture();
    pois.push(poi("", "безымянный объект", "military", 55.0, 37.0));

    let written = engine.index_pois(&pois).await.expect("index");
    assert_eq!(written, 4);
    assert_eq!(index.len(), 4);
    assert!(!index.contains(pois[4].id));
}

#[tokio::test]
async fn index_poi_upserts_one_point_in_place() {
    let (engine, index) = engine();
    let mut target = fixture().remove(1);
    engine.index_poi(&target).await.expect("index");
    target.description = "музей холодной войны".to_string();
    engine.index_poi(&target).await.expect("reindex");

    assert_eq!(index.len(), 1);
    assert!(index.contains(target.id));
    let hits = engine.semantic_search("музей холодной войны", &SearchFilters::default()).await.expect("search");
    assert_eq!(hits.first().map(|h| h.id), Some(target.id));
}

#[tokio::test]
async fn semantic_search_ranks_the_matching_poi_first() {
    let (engine, _) = engine();
    let pois = fixture();
    engine.index_pois(&pois).await.expect("index");

    let hits = engine
        .semantic_search(&pois[1].embedding_text(), &SearchFilters::default())
        .await
        .expect("search");
    assert_eq!(hits.len(), 4);
    assert_eq!(hits[0].id, pois[1].id);
    assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
}

#[tokio::test]
async fn semantic_search_applies_category_and_geo_filters() {
    let (engine, _) = engine();
    let pois = fixture();
    engine.index_pois(&pois).await.expect("index");

    let religious = SearchFilters::default().with_categories(vec!["religious".into()]);
    let hits = engine.semantic_search("собор", &religious).await.expect("search");
    let ids: Vec<Uuid> = hits.iter().map(|h| h.id).collect();
    assert_eq!(hits.len(), 2);
    assert!(ids.contains(&pois[0].id) && ids.contains(&pois[3].id));

    // 20 km around the Kremlin leaves the lavra (~70 km) out of the box.
    let nearby = SearchFilters::default().near(Coordinate::new(55.7520, 37.6175), 20.0);
    let hits = engine.semantic_search("монастырь", &nearby).await.expect("search");
    assert_eq!(hits.len(), 3);
    assert!(!hits.iter().any(|h| h.id == pois[3].id));
}

#[tokio::test]
async fn limit_caps_hits() {
    let (engine, _) = engine();
    engine.index_pois(&fixture()).await.expect("index");
    let filters = SearchFilters { limit: 2, ..Default::default() };
    assert_eq!(engine.semantic_search("храм", &filters).await.expect("search").len(), 2);
}

#[tokio::test]
async fn collection_dimension_is_enforced() {
    let (engine, index) = engine();
    engine.ensure_collection().await.expect("collection");
    let bad = VectorPoint::from_poi(&fixture()[0], vec![0.1; 8]);
    assert!(index.upsert(vec![bad]).await.unwrap_err().is_semantic());
}

#[tokio::test]
async fn reindex_walks_the_whole_store() {
    let (engine, index) = engine();
    let store = MemoryPoiStore::new();
    for i in 0..120 {
        let name = if i % 40 == 0 { String::new() } else { format!("Объект {i}") };
        store.insert(poi(&name, "описание", "architecture", 55.0 + i as f64 * 0.001, 37.0));
    }

    let stats = Reindexer::new(&store, &engine).batch_size(50).run().await.expect("reindex");
    assert_eq!(stats.scanned, 120);
    assert_eq!(stats.indexed, 117);
    assert_eq!(index.len(), 117);
}
