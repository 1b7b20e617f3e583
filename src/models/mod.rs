//! Core data models for the footprint pipeline.

pub mod coord;
pub mod feature;
pub mod polygon;
pub mod region;

pub use coord::GeoCoord;
pub use feature::{Feature, FeatureCollection, Properties};
pub use polygon::{BoundingBox, GeoPolygon, Ring};
pub use region::{NamedRegion, RegionCatalog};
