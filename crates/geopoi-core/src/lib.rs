//! geopoi-core
//!
//! Domain types, the error enum and the traits every storage/search seam is
//! expressed through. Concrete stores live in sibling crates.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod category;
pub mod config;
pub mod deadline;
pub mod error;
pub mod geo;
pub mod ordering;
pub mod telemetry;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
