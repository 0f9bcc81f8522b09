//! geopoi-sql
//!
//! Structured search over the PostGIS `poi` and `categories` tables, plus an
//! in-process store that applies the same filtering and ordering rules.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod memory;
pub mod query;
pub mod row;
pub mod store;

pub use memory::MemoryPoiStore;
pub use query::{Param, PoiQuery};
pub use store::PgPoiStore;
