//! geopoi-hybrid
//!
//! Query normalization and the orchestrator that blends semantic hits with
//! structured search behind the [`PoiSearch`](geopoi_core::traits::PoiSearch)
//! facade.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod merge;
pub mod normalize;
pub mod orchestrator;

pub use normalize::{NormalizedQuery, QueryNormalizer};
pub use orchestrator::{SearchOrchestrator, Strategy};
