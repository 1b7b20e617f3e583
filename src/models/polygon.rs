//! Ring and polygon value types.

use geo::Area;
use geo_types::{LineString, Polygon};

use super::GeoCoord;
use crate::error::{Error, Result};

/// Rings whose planar area (in squared degrees) is at or below this are degenerate.
/// A one-metre square building is roughly 1e-10.
pub const DEGENERATE_AREA_EPSILON: f64 = 1e-18;

/// Lat/lon envelope, inclusive on all sides
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    fn of(vertices: &[GeoCoord]) -> Option<Self> {
        let first = vertices.first()?;
        let mut bbox = BoundingBox {
            min_lat: first.lat(),
            min_lon: first.lon(),
            max_lat: first.lat(),
            max_lon: first.lon(),
        };
        for c in &vertices[1..] {
            bbox.min_lat = bbox.min_lat.min(c.lat());
            bbox.min_lon = bbox.min_lon.min(c.lon());
            bbox.max_lat = bbox.max_lat.max(c.lat());
            bbox.max_lon = bbox.max_lon.max(c.lon());
        }
        Some(bbox)
    }

    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        other.min_lat >= self.min_lat
            && other.max_lat <= self.max_lat
            && other.min_lon >= self.min_lon
            && other.max_lon <= self.max_lon
    }
}

/// Closed boundary stored in open form: the closing vertex is implicit.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    vertices: Vec<GeoCoord>,
    bbox: Option<BoundingBox>,
    degenerate: bool,
}

impl Ring {
    /// Accepts explicitly closed (first == last) or implicitly closed input
    pub fn new(mut vertices: Vec<GeoCoord>) -> Self {
        while vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        let bbox = BoundingBox::of(&vertices);
        let mut ring = Self {
            vertices,
            bbox,
            degenerate: true,
        };
        ring.degenerate =
            ring.vertices.len() < 3 || ring.signed_area().abs() <= DEGENERATE_AREA_EPSILON;
        ring
    }

    pub fn vertices(&self) -> &[GeoCoord] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn bbox(&self) -> Option<BoundingBox> {
        self.bbox
    }

    /// Iterate the ring's edges, including the closing edge back to the start
    pub fn edges(&self) -> impl Iterator<Item = (GeoCoord, GeoCoord)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Shoelace area in squared degrees, positive when counter-clockwise.
    ///
    /// Coordinates are taken relative to the first vertex to keep the
    /// products small for city-scale rings far from the origin.
    pub fn signed_area(&self) -> f64 {
        let Some(origin) = self.vertices.first() else {
            return 0.0;
        };
        let twice: f64 = self
            .edges()
            .map(|(a, b)| {
                let (ax, ay) = (a.x() - origin.x(), a.y() - origin.y());
                let (bx, by) = (b.x() - origin.x(), b.y() - origin.y());
                ax * by - bx * ay
            })
            .sum();
        twice / 2.0
    }

    /// Fewer than three vertices, or no enclosed area
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// Vertices with the first one repeated at the end
    pub fn closed_vertices(&self) -> impl Iterator<Item = &GeoCoord> + '_ {
        self.vertices.iter().chain(self.vertices.first())
    }
}

impl From<&Ring> for LineString<f64> {
    fn from(ring: &Ring) -> Self {
        LineString::new(ring.closed_vertices().map(|c| (*c).into()).collect())
    }
}

impl TryFrom<&LineString<f64>> for Ring {
    type Error = Error;

    fn try_from(line: &LineString<f64>) -> Result<Self> {
        let vertices = line
            .coords()
            .map(|c| GeoCoord::try_from(*c))
            .collect::<Result<Vec<_>>>()?;
        Ok(Ring::new(vertices))
    }
}

/// Outer ring plus zero or more holes
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPolygon {
    outer: Ring,
    holes: Vec<Ring>,
}

impl GeoPolygon {
    pub fn new(outer: Ring, holes: Vec<Ring>) -> Self {
        Self { outer, holes }
    }

    /// Polygon without holes from a vertex list
    pub fn from_vertices(vertices: Vec<GeoCoord>) -> Self {
        Self::new(Ring::new(vertices), Vec::new())
    }

    pub fn outer(&self) -> &Ring {
        &self.outer
    }

    pub fn holes(&self) -> &[Ring] {
        &self.holes
    }

    pub fn bbox(&self) -> Option<BoundingBox> {
        self.outer.bbox()
    }

    pub fn is_degenerate(&self) -> bool {
        self.outer.is_degenerate()
    }

    /// All rings, outer first
    pub fn rings(&self) -> impl Iterator<Item = &Ring> + '_ {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }

    /// Planar area in squared degrees with holes subtracted
    pub fn area(&self) -> f64 {
        Polygon::from(self).unsigned_area()
    }
}

impl From<&GeoPolygon> for Polygon<f64> {
    fn from(p: &GeoPolygon) -> Self {
        Polygon::new(
            LineString::from(&p.outer),
            p.holes.iter().map(LineString::from).collect(),
        )
    }
}

impl TryFrom<&Polygon<f64>> for GeoPolygon {
    type Error = Error;

    fn try_from(p: &Polygon<f64>) -> Result<Self> {
        let outer = Ring::try_from(p.exterior())?;
        let holes = p
            .interiors()
            .iter()
            .map(Ring::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(GeoPolygon::new(outer, holes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lat: f64, lon: f64) -> GeoCoord {
        GeoCoord::new(lat, lon).unwrap()
    }

    #[test]
    fn test_ring_drops_closing_vertex() {
        let ring = Ring::new(vec![c(0.0, 0.0), c(0.0, 1.0), c(1.0, 1.0), c(0.0, 0.0)]);
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.edges().count(), 3);
        assert_eq!(ring.closed_vertices().count(), 4);
    }

    #[test]
    fn test_degenerate_rings() {
        assert!(Ring::new(vec![c(0.0, 0.0), c(1.0, 1.0)]).is_degenerate());
        // Collinear
        assert!(Ring::new(vec![c(0.0, 0.0), c(1.0, 1.0), c(2.0, 2.0)]).is_degenerate());
        // Repeated point
        assert!(Ring::new(vec![c(0.0, 0.0), c(0.0, 0.0), c(1.0, 1.0)]).is_degenerate());
        assert!(!Ring::new(vec![c(0.0, 0.0), c(0.0, 1.0), c(1.0, 1.0)]).is_degenerate());
    }

    #[test]
    fn test_small_building_far_from_origin_is_not_degenerate() {
        // ~5m square in Vitória
        let ring = Ring::new(vec![
            c(-20.31500, -40.28900),
            c(-20.31500, -40.28895),
            c(-20.31505, -40.28895),
            c(-20.31505, -40.28900),
        ]);
        assert!(!ring.is_degenerate());
        assert!((ring.signed_area().abs() - 2.5e-9).abs() < 1e-12);
    }

    #[test]
    fn test_area_subtracts_holes() {
        let outer = Ring::new(vec![c(0.0, 0.0), c(0.0, 4.0), c(4.0, 4.0), c(4.0, 0.0)]);
        let hole = Ring::new(vec![c(1.0, 1.0), c(1.0, 2.0), c(2.0, 2.0), c(2.0, 1.0)]);
        let poly = GeoPolygon::new(outer, vec![hole]);
        assert!((poly.area() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_geo_types_conversion_keeps_axis_order() {
        let poly = GeoPolygon::from_vertices(vec![c(10.0, 20.0), c(10.0, 21.0), c(11.0, 21.0)]);
        let geo: Polygon<f64> = (&poly).into();
        let first = geo.exterior().0[0];
        assert_eq!((first.x, first.y), (20.0, 10.0));

        let back = GeoPolygon::try_from(&geo).unwrap();
        assert_eq!(back, poly);
    }
}
