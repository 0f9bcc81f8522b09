use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Semaphore;
use uuid::Uuid;

use geopoi_cache::key::{embedding_key, poi_key, search_key};
use geopoi_cache::{CacheAside, CacheWriter, CachedEmbedder, CachedSearch, MemoryCacheStore};
use geopoi_core::config::CacheSettings;
use geopoi_core::traits::{CacheStore, Embedder, PoiSearch};
use geopoi_core::types::{Category, Coordinate, Poi, PoiId, SearchFilters, SearchResult};
use geopoi_core::{Error, Result};
use geopoi_embed::FakeEmbedder;

fn poi(name: &str) -> Poi {
    let now = Utc::now();
    Poi {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: String::new(),
        short_description: String::new(),
        lat: 55.75,
        lng: 37.61,
        address: String::new(),
        category: "religious".to_string(),
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
        distance_m: Some(120.0),
    }
}

fn settings() -> CacheSettings { CacheSettings { read_timeout_ms: 50, ..Default::default() } }

struct FailingStore;

#[async_trait]
impl CacheStore for FailingStore {
    async fn get(&self, _: &str) -> Result<Option<Vec<u8>>> { Err(Error::Cache("connection refused".into())) }
    async fn set(&self, _: &str, _: Vec<u8>, _: Duration) -> Result<()> { Err(Error::Cache("connection refused".into())) }
    async fn delete(&self, _: &str) -> Result<()> { Err(Error::Cache("connection refused".into())) }
}

struct SlowStore;

#[async_trait]
impl CacheStore for SlowStore {
    async fn get(&self, _: &str) -> Result<Option<Vec<u8>>> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(None)
    }
    async fn set(&self, _: &str, _: Vec<u8>, _: Duration) -> Result<()> { Ok(()) }
    async fn delete(&self, _: &str) -> Result<()> { Ok(()) }
}

/// `set` waits for a permit, so the worker can be held mid-write.
struct GatedStore {
    gate: Semaphore,
    inner: MemoryCacheStore,
}

#[async_trait]
impl CacheStore for GatedStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> { self.inner.get(key).await }
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let _permit = self.gate.acquire().await.map_err(|e| Error::Cache(e.to_string()))?;
        self.inner.set(key, value, ttl).await
    }
    async fn delete(&self, key: &str) -> Result<()> { self.inner.delete(key).await }
}

#[derive(Default)]
struct CountingSearch {
    searches: AtomicUsize,
    lookups: AtomicUsize,
}

#[async_trait]
impl PoiSearch for CountingSearch {
    async fn search(&self, query: &str, _filters: SearchFilters) -> Result<SearchResult> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        let mut result = SearchResult::from_pois(vec![poi("Храм Христа Спасителя")]);
        result.query = query.to_string();
        Ok(result)
    }

    async fn get_by_id(&self, id: PoiId) -> Result<Poi> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Err(Error::NotFound(id.to_string()))
    }

    async fn categories(&self) -> Result<Vec<Category>> { Ok(vec![]) }
}

#[test]
fn search_keys_are_stable_and_cover_every_filter() {
    let key = |query: &str, filters: &SearchFilters| search_key(query, filters, 50);
    let base = SearchFilters::default().with_categories(vec!["religious".into(), "military".into()]);
    assert_eq!(key("church", &base), key("church", &base));

    let reordered = SearchFilters::default().with_categories(vec!["military".into(), "religious".into()]);
    assert_eq!(key("church", &base), key("church", &reordered));

    let mut centered = base.clone();
    centered.center = Some(Coordinate::new(55.7, 37.6));
    assert_ne!(key("church", &base), key("church", &centered));

    let paged = SearchFilters { offset: 50, ..base.clone() };
    assert_ne!(key("church", &base), key("church", &paged));
    let period = SearchFilters { period: "XIX".into(), ..base.clone() };
    assert_ne!(key("church", &base), key("church", &period));
    assert_ne!(key("church", &base), key("churches", &base));

    // Separator bytes inside user text cannot shift a value into the next field.
    let in_query = SearchFilters::default();
    let in_category = SearchFilters::default().with_categories(vec!["y\u{1f}".into()]);
    assert_ne!(key("x\u{1f}y", &in_query), key("x", &in_category));
    let split = SearchFilters::default().with_categories(vec!["a".into(), "b".into()]);
    let joined = SearchFilters::default().with_categories(vec!["a\u{1e}b".into()]);
    assert_ne!(key("", &split), key("", &joined));

    let k = key("church", &base);
    assert!(k.starts_with("search:") && k.len() == "search:".len() + 32);
    assert!(embedding_key("храм").starts_with("emb:"));
    let id = Uuid::new_v4();
    assert_eq!(poi_key(id), format!("poi:{id}"));
}

#[test]
fn zero_limit_is_keyed_by_the_configured_page_size() {
    let implicit = SearchFilters::default();
    let two = SearchFilters { limit: 2, ..Default::default() };
    let fifty = SearchFilters { limit: 50, ..Default::default() };

    assert_eq!(search_key("парк", &implicit, 2), search_key("парк", &two, 2));
    assert_ne!(search_key("парк", &implicit, 2), search_key("парк", &fifty, 2));
    assert_eq!(search_key("парк", &implicit, 50), search_key("парк", &fifty, 50));
}

#[tokio::test]
async fn miss_computes_once_then_hits() {
    let store = Arc::new(MemoryCacheStore::new());
    let aside = CacheAside::new(store.clone(), &settings());
    let calls = AtomicUsize::new(0);
    let compute = || async {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(poi("Коломенское"))
    };

    let first: Poi = aside.get_or_compute("poi:x", Duration::from_secs(60), compute).await.expect("miss");
    assert_eq!(first.distance_m, None, "round trip flushes internal fields");
    aside.writer().flush().await;
    assert!(store.contains("poi:x"));

    let second: Poi = aside
        .get_or_compute("poi:x", Duration::from_secs(60), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(poi("другое"))
        })
        .await
        .expect("hit");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(second, first);
}

#[tokio::test]
async fn compute_errors_are_not_cached() {
    let store = Arc::new(MemoryCacheStore::new());
    let aside = CacheAside::new(store.clone(), &settings());
    let err = aside
        .get_or_compute::<Poi, _, _>("poi:y", Duration::from_secs(60), || async { Err(Error::Store("down".into())) })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Store(_)));
    aside.writer().flush().await;
    assert!(store.is_empty());
}

#[tokio::test]
async fn unavailable_cache_behaves_like_a_miss() {
    let aside = CacheAside::new(Arc::new(FailingStore), &settings());
    for _ in 0..2 {
        let v: Vec<String> = aside
            .get_or_compute("k", Duration::from_secs(1), || async { Ok(vec!["a".to_string()]) })
            .await
            .expect("compute result despite cache failure");
        assert_eq!(v, vec!["a".to_string()]);
    }
    aside.shutdown().await;
}

#[tokio::test]
async fn slow_cache_reads_time_out_as_misses() {
    let aside = CacheAside::new(Arc::new(SlowStore), &settings());
    let started = std::time::Instant::now();
    let v: u32 = aside.get_or_compute("k", Duration::from_secs(1), || async { Ok(7) }).await.expect("value");
    assert_eq!(v, 7);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn entries_expire_and_can_be_invalidated() {
    let store = Arc::new(MemoryCacheStore::new());
    let aside = CacheAside::new(store.clone(), &settings());
    aside.set("short", &1u32, Duration::from_millis(30)).await.expect("set");
    aside.set("long", &2u32, Duration::from_secs(60)).await.expect("set");
    assert_eq!(aside.get::<u32>("short").await, Some(1));

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(aside.get::<u32>("short").await, None);
    assert_eq!(aside.get::<u32>("long").await, Some(2));

    aside.invalidate("long").await.expect("delete");
    assert_eq!(aside.get::<u32>("long").await, None);
}

#[tokio::test]
async fn full_queue_drops_writes() {
    let store = Arc::new(GatedStore { gate: Semaphore::new(0), inner: MemoryCacheStore::new() });
    let writer = CacheWriter::spawn(store.clone(), 1, Duration::from_secs(1));

    let accepted = (0..10).filter(|i| writer.submit(format!("k{i}"), b"1".to_vec(), Duration::from_secs(60))).count();
    // One write in flight on the worker, one waiting in the queue.
    assert!((1..=2).contains(&accepted), "accepted {accepted}");

    store.gate.add_permits(10);
    writer.shutdown().await;
    assert_eq!(store.inner.len(), accepted);
    assert!(!writer.submit("late".into(), b"1".to_vec(), Duration::from_secs(60)));
}

#[tokio::test]
async fn shutdown_drains_queued_writes() {
    let store = Arc::new(MemoryCacheStore::new());
    let writer = CacheWriter::spawn(store.clone(), 16, Duration::from_secs(1));
    for i in 0..5 {
        assert!(writer.submit(format!("k{i}"), b"{}".to_vec(), Duration::from_secs(60)));
    }
    writer.shutdown().await;
    assert_eq!(store.len(), 5);
}

#[tokio::test]
async fn cached_search_reuses_results_but_not_errors() {
    let aside = Arc::new(CacheAside::new(Arc::new(MemoryCacheStore::new()), &settings()));
    let cached = CachedSearch::new(CountingSearch::default(), aside.clone(), settings());
    let filters = SearchFilters::default().with_categories(vec!["religious".into()]);

    let first = cached.search("найди храм", filters.clone()).await.expect("search");
    aside.writer().flush().await;
    let second = cached.search("найди храм", filters.clone()).await.expect("search");
    assert_eq!(first, second);
    assert_eq!(cached.inner().searches.load(Ordering::SeqCst), 1);

    cached.search("найди храм", SearchFilters::default()).await.expect("search");
    assert_eq!(cached.inner().searches.load(Ordering::SeqCst), 2);

    let id = Uuid::new_v4();
    for _ in 0..2 {
        assert!(matches!(cached.get_by_id(id).await, Err(Error::NotFound(_))));
        aside.writer().flush().await;
    }
    assert_eq!(cached.inner().lookups.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn cached_embedder_stores_single_embeddings() {
    let store = Arc::new(MemoryCacheStore::new());
    let aside = Arc::new(CacheAside::new(store.clone(), &settings()));
    let inner = Arc::new(FakeEmbedder::new(64));
    let cached = CachedEmbedder::new(inner.clone(), aside.clone(), Duration::from_secs(60));

    let v = cached.embed("старая усадьба").await.expect("embed");
    let direct = inner.embed_sync("старая усадьба");
    assert_eq!(v.len(), direct.len());
    assert!(v.iter().zip(&direct).all(|(a, b)| (a - b).abs() < 1e-6));
    aside.writer().flush().await;
    assert!(store.contains(&embedding_key("старая усадьба")));

    let batch = cached.embed_batch(&["a".to_string(), "b".to_string()]).await.expect("batch");
    assert_eq!(batch.len(), 2);
    assert_eq!(store.len(), 1, "batches bypass the cache");
    assert_eq!(cached.dim(), 64);
}
