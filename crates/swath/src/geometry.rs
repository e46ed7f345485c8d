//! Core geometry types for swath.
//!
//! ## Rust Lesson #3: Structs & Derives
//!
//! `Point` is tiny (two `f64`s) so it derives `Copy`: passing it by value
//! is as cheap as passing a reference, and we never have to think about
//! who owns a coordinate.
//!
//! 2-D math treats longitude as `x` and latitude as `y`, so "clockwise"
//! means clockwise on a north-up map.

use crate::error::{Error, Result};

/// Two points closer than this (in degrees, per axis) are the same point.
pub const POINT_EPSILON: f64 = 1e-8;

/// Relative tolerance below which three points count as colinear.
pub const ORIENTATION_EPSILON: f64 = 1e-8;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// A geographic coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub lat: f64,
    pub lng: f64,
}

impl Point {
    #[inline]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build a point from planar `(x, y)` = `(lng, lat)`.
    #[inline]
    pub fn from_xy(x: f64, y: f64) -> Self {
        Self { lat: y, lng: x }
    }

    /// Planar coordinates `[x, y]` = `[lng, lat]`.
    #[inline]
    pub fn xy(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Both coordinates differ by less than `eps`.
    #[inline]
    pub fn approx_eq(&self, other: Point, eps: f64) -> bool {
        (self.lat - other.lat).abs() < eps && (self.lng - other.lng).abs() < eps
    }

    /// `approx_eq` with the default [`POINT_EPSILON`].
    #[inline]
    pub fn same_as(&self, other: Point) -> bool {
        self.approx_eq(other, POINT_EPSILON)
    }

    /// Great-circle distance in meters (haversine).
    pub fn distance_on_earth(&self, other: Point) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_M * c
    }

    /// Euclidean distance in coordinate units.
    #[inline]
    pub fn planar_distance(&self, other: Point) -> f64 {
        (self.lng - other.lng).hypot(self.lat - other.lat)
    }
}

/// How distances are measured.
///
/// `Haversine` is right for real lat/lng input. `Planar` treats the
/// coordinates as a flat grid, which is what projected or synthetic
/// coordinates want.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    #[default]
    Haversine,
    Planar,
}

impl Metric {
    #[inline]
    pub fn distance(&self, a: Point, b: Point) -> f64 {
        match self {
            Metric::Haversine => a.distance_on_earth(b),
            Metric::Planar => a.planar_distance(b),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Haversine => "haversine",
            Metric::Planar => "planar",
        }
    }

    pub fn from_name(name: &str) -> Option<Metric> {
        match name.to_lowercase().as_str() {
            "haversine" | "earth" | "meters" => Some(Metric::Haversine),
            "planar" | "euclidean" | "flat" => Some(Metric::Planar),
            _ => None,
        }
    }

    pub fn all() -> &'static [Metric] {
        &[Metric::Haversine, Metric::Planar]
    }
}

// ============================================================================
// ORIENTATION
// ============================================================================

/// Turn direction of three points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Clockwise,
    CounterClockwise,
    Colinear,
}

/// Orientation of `p1 -> p2 -> p3` from the sign of `(p2 - p1) × (p3 - p2)`.
///
/// The cross product is divided by the squared size of the triple before the
/// epsilon test, so a field measured in thousandths of a degree behaves the
/// same as one measured in meters.
pub fn orientation(p1: Point, p2: Point, p3: Point) -> Orientation {
    let (ax, ay) = (p2.lng - p1.lng, p2.lat - p1.lat);
    let (bx, by) = (p3.lng - p2.lng, p3.lat - p2.lat);

    let size = p1
        .planar_distance(p2)
        .max(p2.planar_distance(p3))
        .max(p1.planar_distance(p3));
    if size == 0.0 {
        return Orientation::Colinear;
    }

    let cross = (ax * by - ay * bx) / (size * size);
    if cross.abs() < ORIENTATION_EPSILON {
        Orientation::Colinear
    } else if cross > 0.0 {
        Orientation::CounterClockwise
    } else {
        Orientation::Clockwise
    }
}

/// Does `q` lie inside the bounding box of segment `p`-`r`?
///
/// Only meaningful once `p`, `q`, `r` are known to be colinear.
#[inline]
pub fn on_segment(p: Point, q: Point, r: Point) -> bool {
    q.lng <= p.lng.max(r.lng) + POINT_EPSILON
        && q.lng >= p.lng.min(r.lng) - POINT_EPSILON
        && q.lat <= p.lat.max(r.lat) + POINT_EPSILON
        && q.lat >= p.lat.min(r.lat) - POINT_EPSILON
}

/// Signed area of a ring with the shoelace formula (`x = lng`, `y = lat`).
///
/// Positive for counter-clockwise rings.
pub fn signed_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].lng * points[j].lat;
        area -= points[j].lng * points[i].lat;
    }
    area / 2.0
}

// ============================================================================
// VECTOR
// ============================================================================

/// A directed segment between two coordinate arrays of equal dimension.
///
/// ## Rust Lesson #4: Result Instead of Exceptions
///
/// Building a vector from mismatched arrays is a caller mistake, so the
/// constructor returns `Result` and the caller decides what to do - there
/// is no hidden throw.
#[derive(Debug, Clone, PartialEq)]
pub struct Vector {
    start: Vec<f64>,
    end: Vec<f64>,
}

impl Vector {
    pub fn new(start: Vec<f64>, end: Vec<f64>) -> Result<Self> {
        if start.is_empty() || end.is_empty() {
            return Err(Error::EmptyVector);
        }
        if start.len() != end.len() {
            return Err(Error::DimensionMismatch {
                left: start.len(),
                right: end.len(),
            });
        }
        Ok(Self { start, end })
    }

    /// A vector from the origin to `end`.
    pub fn from_origin(end: Vec<f64>) -> Result<Self> {
        let start = vec![0.0; end.len()];
        Self::new(start, end)
    }

    /// 2-D segment from `a` to `b`.
    pub fn between(a: Point, b: Point) -> Self {
        Self {
            start: a.xy().to_vec(),
            end: b.xy().to_vec(),
        }
    }

    /// 3-D segment from `a` to `b` lying in the z = 0 plane.
    pub fn lifted(a: Point, b: Point) -> Self {
        Self {
            start: vec![a.lng, a.lat, 0.0],
            end: vec![b.lng, b.lat, 0.0],
        }
    }

    #[inline]
    pub fn start(&self) -> &[f64] {
        &self.start
    }

    #[inline]
    pub fn end(&self) -> &[f64] {
        &self.end
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.start.len()
    }

    /// Component-wise `end - start`.
    pub fn value(&self) -> Vec<f64> {
        self.start
            .iter()
            .zip(&self.end)
            .map(|(s, e)| e - s)
            .collect()
    }

    fn check_dimension(&self, other: &Vector) -> Result<()> {
        if self.dimension() != other.dimension() {
            return Err(Error::DimensionMismatch {
                left: self.dimension(),
                right: other.dimension(),
            });
        }
        Ok(())
    }

    pub fn dot(&self, other: &Vector) -> Result<f64> {
        self.check_dimension(other)?;
        Ok(self
            .value()
            .iter()
            .zip(other.value())
            .map(|(a, b)| a * b)
            .sum())
    }

    /// Cross product as a vector from the origin.
    ///
    /// 2-D inputs are treated as lying in the z = 0 plane, so the result is
    /// always 3-D.
    pub fn cross(&self, other: &Vector) -> Result<Vector> {
        self.check_dimension(other)?;
        let (a, b) = match self.dimension() {
            2 | 3 => (pad3(&self.value()), pad3(&other.value())),
            d => return Err(Error::UnsupportedDimension(d)),
        };

        Vector::from_origin(vec![
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ])
    }

    pub fn midpoint(&self) -> Vec<f64> {
        self.start
            .iter()
            .zip(&self.end)
            .map(|(s, e)| (s + e) / 2.0)
            .collect()
    }

    /// Endpoints as points, for 2-D vectors only.
    pub fn as_segment(&self) -> Option<(Point, Point)> {
        if self.dimension() != 2 {
            return None;
        }
        Some((
            Point::from_xy(self.start[0], self.start[1]),
            Point::from_xy(self.end[0], self.end[1]),
        ))
    }

    /// Midpoint as a point, for 2-D vectors only.
    pub fn midpoint_point(&self) -> Option<Point> {
        let (a, b) = self.as_segment()?;
        Some(Point::new((a.lat + b.lat) / 2.0, (a.lng + b.lng) / 2.0))
    }

    /// Intersection of the two infinite lines through these segments.
    ///
    /// Each line is written as `a·x + b·y = c` and the 2x2 system is solved
    /// directly. Parallel lines (vanishing determinant) give `None`.
    pub fn line_intersection(&self, other: &Vector) -> Option<Point> {
        let (p1, p2) = self.as_segment()?;
        let (p3, p4) = other.as_segment()?;

        let a1 = p2.lat - p1.lat;
        let b1 = p1.lng - p2.lng;
        let c1 = a1 * p1.lng + b1 * p1.lat;

        let a2 = p4.lat - p3.lat;
        let b2 = p3.lng - p4.lng;
        let c2 = a2 * p3.lng + b2 * p3.lat;

        let det = a1 * b2 - a2 * b1;
        let scale = a1.hypot(b1) * a2.hypot(b2);
        if scale == 0.0 || (det / scale).abs() < ORIENTATION_EPSILON {
            return None;
        }

        let x = (b2 * c1 - b1 * c2) / det;
        let y = (a1 * c2 - a2 * c1) / det;
        Some(Point::from_xy(x, y))
    }

    /// Intersection point of two bounded segments.
    ///
    /// General case: the endpoints of each segment straddle the other
    /// (`o1 != o2 && o3 != o4`). Colinear touches are caught with the
    /// on-segment test. Segments that only overlap colinearly have no single
    /// crossing point and give `None`.
    pub fn segment_intersection(&self, other: &Vector) -> Option<Point> {
        let (p1, q1) = self.as_segment()?;
        let (p2, q2) = other.as_segment()?;

        let o1 = orientation(p1, q1, p2);
        let o2 = orientation(p1, q1, q2);
        let o3 = orientation(p2, q2, p1);
        let o4 = orientation(p2, q2, q1);

        if [o1, o2, o3, o4].iter().all(|o| *o == Orientation::Colinear) {
            return None;
        }

        let crosses = (o1 != o2 && o3 != o4)
            || (o1 == Orientation::Colinear && on_segment(p1, p2, q1))
            || (o2 == Orientation::Colinear && on_segment(p1, q2, q1))
            || (o3 == Orientation::Colinear && on_segment(p2, p1, q2))
            || (o4 == Orientation::Colinear && on_segment(p2, q1, q2));

        if !crosses {
            return None;
        }

        self.line_intersection(other)
    }

    /// Point on this segment at the given latitude.
    ///
    /// `None` for horizontal segments and for latitudes outside the segment.
    pub fn point_at_latitude(&self, lat: f64) -> Option<Point> {
        let (a, b) = self.as_segment()?;
        let d_lat = b.lat - a.lat;
        if d_lat == 0.0 {
            return None;
        }

        let t = (lat - a.lat) / d_lat;
        if !(-1e-12..=1.0 + 1e-12).contains(&t) {
            return None;
        }

        Some(Point::new(lat, a.lng + t * (b.lng - a.lng)))
    }

    /// Same pair of endpoints, in either order.
    pub fn is_same_segment(&self, other: &Vector) -> bool {
        let close = |a: &[f64], b: &[f64]| {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < POINT_EPSILON)
        };
        (close(&self.start, &other.start) && close(&self.end, &other.end))
            || (close(&self.start, &other.end) && close(&self.end, &other.start))
    }
}

fn pad3(v: &[f64]) -> [f64; 3] {
    [v[0], v[1], v.get(2).copied().unwrap_or(0.0)]
}

// ============================================================================
// TESTS
// ============================================================================
