//! Embedding providers: the remote embedding service and a deterministic
//! fake for tests and offline development.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

use std::sync::Arc;

use geopoi_core::config::EmbeddingSettings;
use geopoi_core::traits::Embedder;
use geopoi_core::Result;

pub mod fake;
pub mod remote;

pub use fake::FakeEmbedder;
pub use remote::HttpEmbedder;

/// `APP_USE_FAKE_EMBEDDINGS=1` (or `true`) switches to [`FakeEmbedder`].
pub fn use_fake_embeddings() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

pub fn get_default_embedder(settings: &EmbeddingSettings) -> Result<Arc<dyn Embedder>> {
    if use_fake_embeddings() {
        tracing::info!(dim = settings.vector_size, "using FakeEmbedder");
        return Ok(Arc::new(FakeEmbedder::new(settings.vector_size)));
    }
    Ok(Arc::new(HttpEmbedder::new(settings)?))
}
