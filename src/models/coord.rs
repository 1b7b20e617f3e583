//! Geographic coordinate (lat/lon) in WGS84 decimal degrees.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Geographic point (lat/lon)
///
/// Fields are private so every instance went through range validation.
/// Planar geometry treats `lon` as x and `lat` as y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoord", into = "RawCoord")]
pub struct GeoCoord {
    lat: f64,
    lon: f64,
}

#[derive(Serialize, Deserialize)]
struct RawCoord {
    lat: f64,
    lon: f64,
}

impl GeoCoord {
    /// Build a coordinate, rejecting non-finite or out-of-range values
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (MIN_LAT..=MAX_LAT).contains(&lat)
            && (MIN_LON..=MAX_LON).contains(&lon);

        if !valid {
            return Err(Error::InvalidCoordinate { lat, lon });
        }
        Ok(Self { lat, lon })
    }

    /// For compile-time constants known to be in range
    pub(crate) const fn new_unchecked(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build from an (x, y) = (lon, lat) pair, the order used by KML and GeoJSON
    pub fn from_lon_lat(lon: f64, lat: f64) -> Result<Self> {
        Self::new(lat, lon)
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub(crate) fn x(&self) -> f64 {
        self.lon
    }

    pub(crate) fn y(&self) -> f64 {
        self.lat
    }
}

impl TryFrom<RawCoord> for GeoCoord {
    type Error = Error;

    fn try_from(raw: RawCoord) -> Result<Self> {
        GeoCoord::new(raw.lat, raw.lon)
    }
}

impl From<GeoCoord> for RawCoord {
    fn from(c: GeoCoord) -> Self {
        RawCoord {
            lat: c.lat,
            lon: c.lon,
        }
    }
}

impl From<GeoCoord> for geo_types::Coord<f64> {
    fn from(c: GeoCoord) -> Self {
        geo_types::Coord { x: c.lon, y: c.lat }
    }
}

impl From<GeoCoord> for geo_types::Point<f64> {
    fn from(c: GeoCoord) -> Self {
        geo_types::Point::new(c.lon, c.lat)
    }
}

impl TryFrom<geo_types::Coord<f64>> for GeoCoord {
    type Error = Error;

    fn try_from(c: geo_types::Coord<f64>) -> Result<Self> {
        GeoCoord::from_lon_lat(c.x, c.y)
    }
}

impl fmt::Display for GeoCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}
