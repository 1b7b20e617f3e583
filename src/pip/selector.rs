//! Region-of-study selection by reference point.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::containment::contains_point;
use crate::error::{Error, Result};
use crate::models::{GeoCoord, NamedRegion, RegionCatalog};

/// How to choose when several regions contain the reference point
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// First containing region in catalog order
    #[default]
    FirstMatch,
    /// Containing region with the smallest area; ties keep catalog order
    SmallestArea,
}

/// Return the first region whose polygon contains `reference_point`
pub fn select_region<'a>(
    catalog: &'a RegionCatalog,
    reference_point: &GeoCoord,
) -> Result<&'a NamedRegion> {
    select_region_with(catalog, reference_point, SelectionPolicy::FirstMatch)
}

pub fn select_region_with<'a>(
    catalog: &'a RegionCatalog,
    reference_point: &GeoCoord,
    policy: SelectionPolicy,
) -> Result<&'a NamedRegion> {
    let mut containing = catalog.iter().filter(|region| {
        let hit = contains_point(region.polygon(), reference_point);
        debug!("Region '{}' contains {}: {}", region.label, reference_point, hit);
        hit
    });

    let selected = match policy {
        SelectionPolicy::FirstMatch => containing.next(),
        SelectionPolicy::SmallestArea => containing
            .map(|region| (region.polygon().area(), region))
            .fold(None, |best: Option<(f64, &NamedRegion)>, (area, region)| match best {
                Some((best_area, _)) if best_area <= area => best,
                _ => Some((area, region)),
            })
            .map(|(_, region)| region),
    };

    match selected {
        Some(region) => {
            info!(
                "Selected region '{}' for reference point {} ({:?})",
                region.label, reference_point, policy
            );
            Ok(region)
        }
        None => Err(Error::RegionNotFound {
            lat: reference_point.lat(),
            lon: reference_point.lon(),
        }),
    }
}
