//! geopoi-cache
//!
//! Cache-aside around the search facade and the embedder. Reads are
//! synchronous and bounded by a timeout; writes go through a bounded
//! background queue and never fail the caller.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod aside;
pub mod embedder;
pub mod key;
pub mod service;
pub mod store;
pub mod writer;

pub use aside::CacheAside;
pub use embedder::CachedEmbedder;
pub use service::CachedSearch;
pub use store::{MemoryCacheStore, PgCacheStore};
pub use writer::CacheWriter;
