use std::fs;

use geopoi_core::config::{CacheBackend, Config, Settings};
use geopoi_core::Error;

#[test]
fn defaults_apply_without_any_files() {
    let tmp = tempfile::TempDir::new().expect("tmp");
    let config = Config::load_from(tmp.path(), "test").expect("load");
    let settings = config.settings().expect("settings");

    assert_eq!(settings.search.default_limit, 50);
    assert_eq!(settings.search.supplement_threshold, 10);
    assert_eq!(settings.search.max_merged_results, 50);
    assert!(!settings.search.fallback_on_empty_semantic);
    assert_eq!(settings.cache.search_ttl_secs, 300);
    assert_eq!(settings.qdrant.vector_size, 384);
    let order: Vec<_> = settings.normalizer.categories.iter().map(|c| c.category.as_str()).collect();
    assert_eq!(order, vec!["religious", "military", "architecture"]);
}

#[test]
fn env_file_overrides_base_file() {
    let tmp = tempfile::TempDir::new().expect("tmp");
    fs::write(
        tmp.path().join("config.toml"),
        "[cache]\nbackend = \"memory\"\nsearch_ttl_secs = 60\n[search]\nsupplement_threshold = 5\n",
    )
    .expect("write base");
    fs::write(tmp.path().join("config.test.toml"), "[cache]\nsearch_ttl_secs = 10\n").expect("write env");

    let config = Config::load_from(tmp.path(), "test").expect("load");
    let settings = config.settings().expect("settings");
    assert_eq!(settings.cache.backend, CacheBackend::Memory);
    assert_eq!(settings.cache.search_ttl_secs, 10);
    assert_eq!(settings.search.supplement_threshold, 5);
    let ttl: u64 = config.get("cache.search_ttl_secs").expect("get");
    assert_eq!(ttl, 10);
}

#[test]
fn zero_merge_cap_is_rejected() {
    let tmp = tempfile::TempDir::new().expect("tmp");
    fs::write(tmp.path().join("config.toml"), "[search]\nmax_merged_results = 0\n").expect("write");
    assert!(Config::load_from(tmp.path(), "dev").is_err());
}

#[test]
fn zero_vector_sizes_are_rejected() {
    let tmp = tempfile::TempDir::new().expect("tmp");
    fs::write(tmp.path().join("config.toml"), "[embedding]\nvector_size = 0\n").expect("write");
    let err = Config::load_from(tmp.path(), "dev").err().expect("rejected");
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::InvalidConfig(m)) if m.contains("embedding.vector_size")));

    let mut settings = Settings::default();
    settings.qdrant.vector_size = 0;
    assert!(matches!(settings.validate("dev"), Err(Error::InvalidConfig(m)) if m.contains("qdrant.vector_size")));
    settings.embedding.enabled = false;
    assert!(settings.validate("dev").is_ok(), "sizes only matter when embeddings are enabled");
}

#[test]
fn production_requires_an_embedding_url() {
    let mut settings = Settings::default();
    settings.embedding.url.clear();
    assert!(matches!(settings.validate("prod"), Err(Error::InvalidConfig(_))));
    assert!(settings.validate("dev").is_ok());
}
