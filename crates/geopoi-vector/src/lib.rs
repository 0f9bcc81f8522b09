//! geopoi-vector
//!
//! Semantic retrieval: a Qdrant-backed [`VectorIndex`](geopoi_core::traits::VectorIndex),
//! an in-process index, and [`VectorSearchEngine`] which embeds the query and
//! runs the similarity search. `writer` pushes POIs from the relational store
//! into the vector store.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod filter;
pub mod memory;
pub mod qdrant;
pub mod schema;
pub mod search;
pub mod writer;

pub use memory::MemoryVectorIndex;
pub use qdrant::QdrantPoiIndex;
pub use search::VectorSearchEngine;
