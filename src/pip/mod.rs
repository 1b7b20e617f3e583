//! Point-in-Polygon (PIP) containment, region selection and footprint filtering.

pub mod containment;
mod filter;
mod selector;

pub use containment::{contains_point, contains_polygon, locate_point, Position};
pub use filter::{filter_within, filter_within_with_progress};
pub use selector::{select_region, select_region_with, SelectionPolicy};
