//! Planar geometry primitives in a projected CRS (metres).

use geo::{Closest, ClosestPoint, Line};
use hn_core::wrap_angle;
use serde::{Deserialize, Serialize};

/// Grid used to turn coordinates into hashable keys (1 µm).
const COORD_QUANTUM: f64 = 1e-6;

/// A 2D coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new(0.5 * (self.x + other.x), 0.5 * (self.y + other.y))
    }

    /// Hashable key; two points with the same key are the same network node.
    pub fn key(self) -> CoordKey {
        CoordKey(
            (self.x / COORD_QUANTUM).round() as i64,
            (self.y / COORD_QUANTUM).round() as i64,
        )
    }

    /// Arithmetic mean of a point set, `None` for an empty slice.
    pub fn centroid(points: &[Point]) -> Option<Point> {
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        let (sx, sy) = points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Some(Point::new(sx / n, sy / n))
    }

    pub(crate) fn to_coord(self) -> geo::Coord<f64> {
        geo::Coord {
            x: self.x,
            y: self.y,
        }
    }
}

impl From<[f64; 2]> for Point {
    fn from(v: [f64; 2]) -> Self {
        Point::new(v[0], v[1])
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// Quantized coordinate used as a map key for node identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoordKey(i64, i64);

/// A straight line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    pub fn midpoint(&self) -> Point {
        self.start.midpoint(self.end)
    }

    /// Direction of travel start → end, radians.
    pub fn heading(&self) -> f64 {
        (self.end.y - self.start.y).atan2(self.end.x - self.start.x)
    }

    /// Perpendicular foot of `p` on this segment, clamped to the segment.
    pub fn closest_point(&self, p: Point) -> Point {
        let line = Line::new(self.start.to_coord(), self.end.to_coord());
        match line.closest_point(&geo::Point::from(p.to_coord())) {
            Closest::Intersection(c) | Closest::SinglePoint(c) => Point::new(c.x(), c.y()),
            // Zero-length segment: every point of it is equally close.
            Closest::Indeterminate => self.start,
        }
    }

    pub fn distance_to(&self, p: Point) -> f64 {
        p.distance(self.closest_point(p))
    }
}

/// Absolute change of heading when travelling a → b → c, radians in `[0, pi]`.
pub fn deflection(a: Point, b: Point, c: Point) -> f64 {
    let first = Segment::new(a, b).heading();
    let second = Segment::new(b, c).heading();
    wrap_angle(second - first).abs()
}

/// Translate `p` by `distance` along the direction `angle_deg` (counter-clockwise from +x).
pub fn offset_point(p: Point, distance: f64, angle_deg: f64) -> Point {
    let rad = angle_deg.to_radians();
    Point::new(p.x + distance * rad.cos(), p.y + distance * rad.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closest_point_is_perpendicular_foot() {
        let seg = Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        let foot = seg.closest_point(Point::new(4.0, 3.0));
        assert!((foot.x - 4.0).abs() < 1e-12);
        assert!(foot.y.abs() < 1e-12);
        assert!((seg.distance_to(Point::new(4.0, 3.0)) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn closest_point_clamps_to_endpoint() {
        let seg = Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        let foot = seg.closest_point(Point::new(-5.0, 1.0));
        assert_eq!(foot, Point::new(0.0, 0.0));
    }

    #[test]
    fn degenerate_segment_projects_to_start() {
        let seg = Segment::new(Point::new(2.0, 2.0), Point::new(2.0, 2.0));
        assert_eq!(seg.closest_point(Point::new(5.0, 6.0)), Point::new(2.0, 2.0));
        assert!((seg.distance_to(Point::new(5.0, 6.0)) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn deflection_of_straight_and_right_angle() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 0.0);
        assert!(deflection(a, b, Point::new(2.0, 0.0)) < 1e-12);
        let right = deflection(a, b, Point::new(1.0, 1.0));
        assert!((right - core::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn deflection_handles_heading_wraparound() {
        // Headings of +179° and -179° differ by 2°, not 358°.
        let a = Point::new(1.0, -0.017);
        let b = Point::new(0.0, 0.0);
        let c = Point::new(-1.0, -0.017);
        assert!(deflection(a, b, c) < 0.1);
    }

    #[test]
    fn offset_point_translates_by_polar_vector() {
        let p = offset_point(Point::new(1.0, 1.0), 2.0, 90.0);
        assert!((p.x - 1.0).abs() < 1e-12);
        assert!((p.y - 3.0).abs() < 1e-12);
    }

    #[test]
    fn coord_key_merges_sub_micrometre_noise() {
        let a = Point::new(10.0, 20.0);
        let b = Point::new(10.0 + 1e-9, 20.0 - 1e-9);
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), Point::new(10.001, 20.0).key());
    }

    #[test]
    fn centroid_of_square() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(0.0, 2.0),
        ];
        assert_eq!(Point::centroid(&pts), Some(Point::new(1.0, 1.0)));
        assert_eq!(Point::centroid(&[]), None);
    }
}
