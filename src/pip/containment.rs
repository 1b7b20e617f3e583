//! Point-in-polygon and polygon-in-polygon tests.
//!
//! Containment is boundary-inclusive: a point on an edge or vertex of the
//! outer ring or of a hole counts as contained. Degenerate polygons (fewer
//! than three vertices, or no area) never contain anything and are never
//! contained.
//!
//! All arithmetic is planar in (lon, lat) degree space.

use geo::InteriorPoint;
use geo_types::{LineString, Polygon};

use crate::models::{BoundingBox, GeoCoord, GeoPolygon, Ring};

/// Distance (degrees) within which a point counts as lying on an edge.
/// About 0.1 µm at the equator.
pub const ON_EDGE_EPSILON: f64 = 1e-12;

/// Where a point lies relative to a polygon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Inside,
    OnBoundary,
    Outside,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pt {
    x: f64,
    y: f64,
}

impl Pt {
    fn sub(self, o: Pt) -> Pt {
        Pt {
            x: self.x - o.x,
            y: self.y - o.y,
        }
    }

    fn cross(self, o: Pt) -> f64 {
        self.x * o.y - self.y * o.x
    }

    fn dot(self, o: Pt) -> f64 {
        self.x * o.x + self.y * o.y
    }

    fn len(self) -> f64 {
        self.x.hypot(self.y)
    }

    fn lerp(self, to: Pt, t: f64) -> Pt {
        Pt {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
        }
    }
}

impl From<GeoCoord> for Pt {
    fn from(c: GeoCoord) -> Self {
        Pt { x: c.lon(), y: c.lat() }
    }
}

fn ring_edges(ring: &Ring) -> impl Iterator<Item = (Pt, Pt)> + '_ {
    ring.edges().map(|(a, b)| (Pt::from(a), Pt::from(b)))
}

fn on_segment(a: Pt, b: Pt, p: Pt) -> bool {
    let ab = b.sub(a);
    let ap = p.sub(a);
    if ab.cross(ap).abs() > ON_EDGE_EPSILON * ab.len().max(ON_EDGE_EPSILON) {
        return false;
    }
    p.x >= a.x.min(b.x) - ON_EDGE_EPSILON
        && p.x <= a.x.max(b.x) + ON_EDGE_EPSILON
        && p.y >= a.y.min(b.y) - ON_EDGE_EPSILON
        && p.y <= a.y.max(b.y) + ON_EDGE_EPSILON
}

/// Odd-even ray cast towards +x, after an explicit on-edge check
fn locate_in_ring(ring: &Ring, p: Pt) -> Position {
    let mut inside = false;
    for (a, b) in ring_edges(ring) {
        if on_segment(a, b, p) {
            return Position::OnBoundary;
        }
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x_cross {
                inside = !inside;
            }
        }
    }
    if inside {
        Position::Inside
    } else {
        Position::Outside
    }
}

fn locate(polygon: &GeoPolygon, p: Pt) -> Position {
    if polygon.is_degenerate() {
        return Position::Outside;
    }
    match locate_in_ring(polygon.outer(), p) {
        Position::Inside => {}
        other => return other,
    }
    for hole in polygon.holes().iter().filter(|h| !h.is_degenerate()) {
        match locate_in_ring(hole, p) {
            Position::Inside => return Position::Outside,
            Position::OnBoundary => return Position::OnBoundary,
            Position::Outside => {}
        }
    }
    Position::Inside
}

/// Classify a point against a polygon
pub fn locate_point(polygon: &GeoPolygon, point: &GeoCoord) -> Position {
    locate(polygon, Pt::from(*point))
}

/// Boundary-inclusive point-in-polygon
pub fn contains_point(boundary: &GeoPolygon, point: &GeoCoord) -> bool {
    locate_point(boundary, point) != Position::Outside
}

/// Parameters along `a -> b` where it meets `c -> d`, clamped to [0, 1]
fn intersection_params(a: Pt, b: Pt, c: Pt, d: Pt, out: &mut Vec<f64>) {
    let r = b.sub(a);
    let s = d.sub(c);
    let qp = c.sub(a);
    let denom = r.cross(s);

    if denom.abs() > f64::EPSILON * r.len() * s.len() {
        let t = qp.cross(s) / denom;
        let u = qp.cross(r) / denom;
        let slack = ON_EDGE_EPSILON / r.len().max(ON_EDGE_EPSILON);
        let u_slack = ON_EDGE_EPSILON / s.len().max(ON_EDGE_EPSILON);
        if (-slack..=1.0 + slack).contains(&t) && (-u_slack..=1.0 + u_slack).contains(&u) {
            out.push(t.clamp(0.0, 1.0));
        }
        return;
    }

    // Parallel: only collinear overlaps matter
    if qp.cross(r).abs() > ON_EDGE_EPSILON * r.len() {
        return;
    }
    let rr = r.dot(r);
    for end in [c, d] {
        let t = end.sub(a).dot(r) / rr;
        if (0.0..=1.0).contains(&t) {
            out.push(t);
        }
    }
}

/// Split `a -> b` at every meeting with the rings of `splitter`, leaving the
/// sorted cut parameters in `params`
fn split_edge(splitter: &GeoPolygon, a: Pt, b: Pt, params: &mut Vec<f64>) {
    params.clear();
    params.push(0.0);
    params.push(1.0);
    for ring in splitter.rings().filter(|r| !r.is_degenerate()) {
        for (c, d) in ring_edges(ring) {
            intersection_params(a, b, c, d, params);
        }
    }
    params.sort_by(f64::total_cmp);
    params.dedup();
}

/// Midpoints of the pieces between consecutive cut parameters
fn piece_midpoints(a: Pt, b: Pt, params: &[f64]) -> impl Iterator<Item = Pt> + '_ {
    params
        .windows(2)
        .filter(|w| w[1] - w[0] > f64::EPSILON)
        .map(move |w| a.lerp(b, (w[0] + w[1]) / 2.0))
}

/// Every piece of `a -> b` between boundary crossings stays inside or on the boundary
fn edge_within(boundary: &GeoPolygon, a: Pt, b: Pt, params: &mut Vec<f64>) -> bool {
    if a == b {
        return true;
    }
    split_edge(boundary, a, b, params);
    piece_midpoints(a, b, params).all(|m| locate(boundary, m) != Position::Outside)
}

/// Some part of the hole's area lies strictly inside `subject`
fn hole_overlaps(subject: &GeoPolygon, hole: &Ring, params: &mut Vec<f64>) -> bool {
    let edge_enters = ring_edges(hole).any(|(a, b)| {
        if a == b {
            return false;
        }
        split_edge(subject, a, b, params);
        piece_midpoints(a, b, params).any(|m| locate(subject, m) == Position::Inside)
    });
    if edge_enters {
        return true;
    }

    // Hole edges may all run along the subject's boundary
    let hole_area = Polygon::new(LineString::from(hole), Vec::new());
    match hole_area.interior_point() {
        Some(p) => locate(subject, Pt { x: p.x(), y: p.y() }) == Position::Inside,
        None => false,
    }
}

fn bbox_within(outer: &BoundingBox, inner: &BoundingBox) -> bool {
    let padded = BoundingBox {
        min_lat: outer.min_lat - ON_EDGE_EPSILON,
        min_lon: outer.min_lon - ON_EDGE_EPSILON,
        max_lat: outer.max_lat + ON_EDGE_EPSILON,
        max_lon: outer.max_lon + ON_EDGE_EPSILON,
    };
    padded.contains_box(inner)
}

/// Whether `subject` lies entirely within `boundary`.
///
/// A building touching the boundary from inside (shared edge or vertex) is
/// contained; one that crosses it, even only through a boundary vertex, is
/// not. A boundary hole inside the subject also excludes it.
pub fn contains_polygon(boundary: &GeoPolygon, subject: &GeoPolygon) -> bool {
    if boundary.is_degenerate() || subject.is_degenerate() {
        return false;
    }

    match (boundary.bbox(), subject.bbox()) {
        (Some(outer), Some(inner)) if bbox_within(&outer, &inner) => {}
        _ => return false,
    }

    let outer = subject.outer();
    if !outer.vertices().iter().all(|v| contains_point(boundary, v)) {
        return false;
    }

    let mut params = Vec::new();
    if !ring_edges(outer).all(|(a, b)| edge_within(boundary, a, b, &mut params)) {
        return false;
    }

    let holes: Vec<&Ring> = boundary
        .holes()
        .iter()
        .filter(|h| !h.is_degenerate())
        .collect();
    if holes.is_empty() {
        return true;
    }

    if holes.iter().any(|hole| hole_overlaps(subject, hole, &mut params)) {
        return false;
    }

    // A subject whose ring coincides with a hole's ring passes every check above
    match Polygon::from(subject).interior_point() {
        Some(p) => locate(boundary, Pt { x: p.x(), y: p.y() }) != Position::Outside,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coordinate_position::{CoordPos, CoordinatePosition};

    fn c(lat: f64, lon: f64) -> GeoCoord {
        GeoCoord::new(lat, lon).unwrap()
    }

    /// Polygon from (lon, lat) pairs, the way they are usually drawn
    fn poly(xy: &[(f64, f64)]) -> GeoPolygon {
        GeoPolygon::from_vertices(xy.iter().map(|&(x, y)| c(y, x)).collect())
    }

    fn poly_with_holes(outer: &[(f64, f64)], holes: &[&[(f64, f64)]]) -> GeoPolygon {
        let ring = |xy: &[(f64, f64)]| Ring::new(xy.iter().map(|&(x, y)| c(y, x)).collect());
        GeoPolygon::new(ring(outer), holes.iter().map(|h| ring(*h)).collect())
    }

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> GeoPolygon {
        poly(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1)])
    }

    /// L-shaped boundary with a reflex vertex at (2, 2)
    fn l_shape() -> GeoPolygon {
        poly(&[(0.0, 0.0), (4.0, 0.0), (4.0, 2.0), (2.0, 2.0), (2.0, 4.0), (0.0, 4.0)])
    }

    #[test]
    fn test_point_inside_and_outside() {
        let b = square(0.0, 0.0, 4.0, 4.0);
        assert_eq!(locate_point(&b, &c(2.0, 2.0)), Position::Inside);
        assert_eq!(locate_point(&b, &c(2.0, 5.0)), Position::Outside);
        assert!(!contains_point(&b, &c(-1.0, 2.0)));
    }

    #[test]
    fn test_point_on_edge_and_vertex_is_contained() {
        let b = square(0.0, 0.0, 4.0, 4.0);
        assert_eq!(locate_point(&b, &c(0.0, 2.0)), Position::OnBoundary);
        assert_eq!(locate_point(&b, &c(4.0, 4.0)), Position::OnBoundary);
        assert!(contains_point(&b, &c(0.0, 2.0)));

        let tri = poly(&[(0.0, 0.0), (3.0, 0.0), (0.0, 3.0)]);
        // On the hypotenuse x + y = 3
        assert!(contains_point(&tri, &c(1.2, 1.8)));
        assert!(contains_point(&tri, &c(0.1 + 0.2, 2.7)));
    }

    #[test]
    fn test_point_in_hole() {
        let b = poly_with_holes(
            &[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)],
            &[&[(1.0, 1.0), (3.0, 1.0), (3.0, 3.0), (1.0, 3.0)]],
        );
        assert_eq!(locate_point(&b, &c(2.0, 2.0)), Position::Outside);
        assert_eq!(locate_point(&b, &c(2.0, 1.0)), Position::OnBoundary);
        assert_eq!(locate_point(&b, &c(0.5, 0.5)), Position::Inside);
    }

    #[test]
    fn test_degenerate_boundary_contains_nothing() {
        let line = poly(&[(0.0, 0.0), (4.0, 4.0)]);
        assert!(!contains_point(&line, &c(0.0, 0.0)));

        let flat = poly(&[(0.0, 0.0), (2.0, 2.0), (4.0, 4.0)]);
        assert!(!contains_point(&flat, &c(1.0, 1.0)));
        assert!(!contains_polygon(&flat, &square(1.0, 1.0, 1.5, 1.5)));
    }

    #[test]
    fn test_degenerate_subject_is_not_contained() {
        let b = square(0.0, 0.0, 4.0, 4.0);
        assert!(!contains_polygon(&b, &poly(&[(1.0, 1.0), (2.0, 2.0)])));
        assert!(!contains_polygon(&b, &poly(&[(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)])));
    }

    #[test]
    fn test_agrees_with_geo_off_boundary() {
        let b = poly_with_holes(
            &[(0.0, 0.0), (4.0, 0.0), (4.0, 2.0), (2.0, 2.0), (2.0, 4.0), (0.0, 4.0)],
            &[&[(1.0, 1.0), (1.0, 3.0), (1.5, 3.0), (1.5, 1.0)]],
        );
        let geo_poly = Polygon::from(&b);

        for i in 0..20 {
            for j in 0..20 {
                let x = -0.375 + 0.25 * i as f64;
                let y = -0.375 + 0.25 * j as f64;
                let expected = geo_poly.coordinate_position(&geo_types::Coord { x, y });
                let got = locate_point(&b, &c(y, x));
                match expected {
                    CoordPos::Inside => assert_eq!(got, Position::Inside, "({x}, {y})"),
                    CoordPos::Outside => assert_eq!(got, Position::Outside, "({x}, {y})"),
                    CoordPos::OnBoundary => unreachable!("grid avoids edges"),
                }
            }
        }
    }

    #[test]
    fn test_polygon_fully_inside() {
        let b = square(0.0, 0.0, 4.0, 4.0);
        assert!(contains_polygon(&b, &square(1.0, 1.0, 2.0, 2.0)));
    }

    #[test]
    fn test_polygon_fully_outside() {
        let b = square(0.0, 0.0, 4.0, 4.0);
        assert!(!contains_polygon(&b, &square(5.0, 5.0, 6.0, 6.0)));
    }

    #[test]
    fn test_polygon_straddling_edge() {
        let b = square(0.0, 0.0, 4.0, 4.0);
        assert!(!contains_polygon(&b, &square(3.0, 1.0, 5.0, 2.0)));
    }

    #[test]
    fn test_polygon_sharing_edge_is_contained() {
        let b = square(0.0, 0.0, 4.0, 4.0);
        assert!(contains_polygon(&b, &square(0.0, 0.0, 1.0, 1.0)));
        assert!(contains_polygon(&b, &b.clone()));
    }

    #[test]
    fn test_edge_passing_through_reflex_vertex() {
        let b = l_shape();
        // The closing edge (3, 1) -> (1, 3) touches the notch corner at (2, 2)
        let subject = poly(&[(1.0, 3.0), (1.0, 1.0), (3.0, 1.0)]);
        assert!(contains_polygon(&b, &subject));

        // Pushed past the corner the same edge cuts through the notch
        let crossing = poly(&[(1.5, 3.5), (1.0, 1.0), (3.5, 1.5)]);
        assert!(!contains_polygon(&b, &crossing));
    }

    #[test]
    fn test_edge_entering_and_leaving_through_vertices() {
        // Diamond hole; the line y = 2 passes through its left and right vertices
        let b = poly_with_holes(
            &[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)],
            &[&[(2.0, 1.0), (3.0, 2.0), (2.0, 3.0), (1.0, 2.0)]],
        );
        let mut params = Vec::new();
        let a = Pt { x: 0.5, y: 2.0 };
        let z = Pt { x: 3.5, y: 2.0 };
        assert!(contains_point(&b, &c(2.0, 0.5)));
        assert!(contains_point(&b, &c(2.0, 3.5)));
        assert!(!edge_within(&b, a, z, &mut params));

        let below = (Pt { x: 0.5, y: 0.5 }, Pt { x: 3.5, y: 0.5 });
        assert!(edge_within(&b, below.0, below.1, &mut params));
    }

    #[test]
    fn test_edge_touching_reflex_vertex_from_inside() {
        let b = l_shape();
        let subject = poly(&[(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 2.0)]);
        assert!(contains_polygon(&b, &subject));
    }

    #[test]
    fn test_boundary_hole_inside_subject() {
        let b = poly_with_holes(
            &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)],
            &[&[(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0)]],
        );
        // Encloses the hole entirely
        assert!(!contains_polygon(&b, &square(3.0, 3.0, 7.0, 7.0)));
        // Overlaps part of the hole
        assert!(!contains_polygon(&b, &square(5.0, 5.0, 8.0, 8.0)));
        // Wraps around the hole with a matching hole of its own
        let donut = poly_with_holes(
            &[(3.0, 3.0), (7.0, 3.0), (7.0, 7.0), (3.0, 7.0)],
            &[&[(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0)]],
        );
        assert!(contains_polygon(&b, &donut));
        // Clear of the hole
        assert!(contains_polygon(&b, &square(7.0, 7.0, 9.0, 9.0)));
    }

    #[test]
    fn test_hole_with_vertices_on_subject_edges() {
        let b = poly_with_holes(
            &[(-5.0, -5.0), (15.0, -5.0), (15.0, 15.0), (-5.0, 15.0)],
            &[&[(0.0, 0.0), (3.0, 0.0), (0.0, 3.0)]],
        );
        assert_eq!(locate_point(&b, &c(1.0, 1.0)), Position::Outside);
        // Every hole vertex sits on the subject's outline, the hypotenuse cuts through it
        assert!(!contains_polygon(&b, &square(0.0, 0.0, 10.0, 10.0)));
        // Touching the hole at a single corner only
        assert!(contains_polygon(&b, &square(3.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_subject_coinciding_with_hole() {
        let b = poly_with_holes(
            &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)],
            &[&[(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0)]],
        );
        assert!(!contains_polygon(&b, &square(4.0, 4.0, 6.0, 6.0)));
    }
}
