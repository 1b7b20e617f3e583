//! Filtering a building catalog down to the footprints inside a boundary.

use tracing::debug;

use super::containment::contains_polygon;
use crate::models::{FeatureCollection, GeoPolygon};

/// Keep the candidates fully contained in `boundary`, in their original order
pub fn filter_within(boundary: &GeoPolygon, candidates: &FeatureCollection) -> FeatureCollection {
    filter_within_with_progress(boundary, candidates, || {})
}

/// Same as [`filter_within`], calling `on_item` once per candidate examined
pub fn filter_within_with_progress<F>(
    boundary: &GeoPolygon,
    candidates: &FeatureCollection,
    mut on_item: F,
) -> FeatureCollection
where
    F: FnMut(),
{
    let retained: FeatureCollection = candidates
        .iter()
        .filter(|feature| {
            on_item();
            contains_polygon(boundary, &feature.polygon)
        })
        .cloned()
        .collect();

    debug!(
        "Retained {} of {} candidates",
        retained.len(),
        candidates.len()
    );

    retained
}
