//! Sweep rows: where each latitude line crosses the polygon boundary.
//!
//! ## Algorithm
//!
//! For each row latitude, intersect every non-horizontal edge, sort the
//! hits west to east and pair them up: `(p0, p1)`, `(p2, p3)`, ... Each
//! pair is one leg that lies inside the field.
//!
//! A row passing exactly through a vertex would hit both edges meeting
//! there. An endpoint hit is therefore only counted when the edge's other
//! endpoint lies strictly south of the row. A vertex the row passes
//! through is counted once, and a vertex the row only grazes is counted
//! zero or two times, which keeps the count even.

use crate::geometry::{POINT_EPSILON, Point, Vector};
use crate::polygon::{Polygon, SweepSpec};

/// Boundary crossings of one sweep line, sorted by longitude.
///
/// Always holds an even number of points, at least two.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepRow {
    /// Row index in its [`SweepSpec`] (north to south)
    pub index: usize,
    pub latitude: f64,
    pub points: Vec<Point>,
}

impl SweepRow {
    /// Number of `(entry, exit)` pairs.
    #[inline]
    pub fn pairs(&self) -> usize {
        self.points.len() / 2
    }

    /// The `i`th pair, west point first.
    pub fn pair(&self, i: usize) -> Option<(Point, Point)> {
        let a = *self.points.get(2 * i)?;
        let b = *self.points.get(2 * i + 1)?;
        Some((a, b))
    }
}

/// All non-empty rows of `polygon` under `spec`, north to south.
pub fn sweep_rows(polygon: &Polygon, spec: &SweepSpec) -> Vec<SweepRow> {
    (0..spec.rows())
        .filter_map(|i| sweep_row(polygon, i, spec.latitude(i)))
        .collect()
}

/// Crossings of the latitude line `lat`, or `None` if the row only touches
/// the boundary.
pub fn sweep_row(polygon: &Polygon, index: usize, lat: f64) -> Option<SweepRow> {
    let vertices = polygon.vertices();
    let n = vertices.len();
    let mut points = Vec::new();

    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        let Some(hit) = Vector::between(a, b).point_at_latitude(lat) else {
            continue;
        };

        let at_a = (a.lat - lat).abs() < POINT_EPSILON;
        let at_b = (b.lat - lat).abs() < POINT_EPSILON;
        if (at_a && b.lat >= lat) || (at_b && a.lat >= lat) {
            continue;
        }

        points.push(hit);
    }

    points.sort_by(|a, b| a.lng.total_cmp(&b.lng));

    // Coincident neighbors form a zero-length leg
    let mut cleaned = Vec::with_capacity(points.len());
    let mut i = 0;
    while i < points.len() {
        if i + 1 < points.len() && points[i].same_as(points[i + 1]) {
            i += 2;
            continue;
        }
        cleaned.push(points[i]);
        i += 1;
    }

    if cleaned.len() % 2 == 1 {
        log::warn!(
            "row {} at lat {:.7} has {} crossings, dropping the last",
            index,
            lat,
            cleaned.len()
        );
        cleaned.pop();
    }

    if cleaned.len() < 2 {
        return None;
    }

    Some(SweepRow {
        index,
        latitude: lat,
        points: cleaned,
    })
}

// ============================================================================
// TESTS
// ============================================================================
