//! Footprint - filters building footprints down to a region of study.
//!
//! The region is picked from a catalog of neighbourhood polygons by a
//! reference point, then every building polygon fully inside it is kept
//! and written out.

pub mod config;
pub mod distance;
pub mod error;
pub mod models;
pub mod pip;
pub mod pipeline;
pub mod store;

pub use error::{Error, Result};
pub use models::{Feature, FeatureCollection, GeoCoord, GeoPolygon};
pub use pipeline::{Pipeline, RunSummary};
