//! Named regions used for region-of-study selection.

use super::{Feature, FeatureCollection, GeoPolygon};

/// Property keys checked, in order, when a feature carries no name
const LABEL_KEYS: &[&str] = &["name", "Name", "NAME", "nome", "NOME"];

/// A region polygon with its identifying label
#[derive(Debug, Clone, PartialEq)]
pub struct NamedRegion {
    pub label: String,
    pub feature: Feature,
}

impl NamedRegion {
    pub fn polygon(&self) -> &GeoPolygon {
        &self.feature.polygon
    }
}

/// Regions in source order
#[derive(Debug, Clone, Default)]
pub struct RegionCatalog {
    regions: Vec<NamedRegion>,
}

impl RegionCatalog {
    pub fn new(regions: Vec<NamedRegion>) -> Self {
        Self { regions }
    }

    /// Label each feature by its name, a name-like property, or its position
    pub fn from_features(features: FeatureCollection) -> Self {
        let regions = features
            .into_iter()
            .enumerate()
            .map(|(idx, feature)| {
                let label = feature
                    .name
                    .clone()
                    .filter(|n| !n.trim().is_empty())
                    .or_else(|| LABEL_KEYS.iter().find_map(|k| feature.property_str(k)))
                    .unwrap_or_else(|| format!("region-{}", idx));
                NamedRegion { label, feature }
            })
            .collect();
        Self { regions }
    }

    pub fn regions(&self) -> &[NamedRegion] {
        &self.regions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NamedRegion> {
        self.regions.iter()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
