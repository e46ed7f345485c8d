//! Field boundaries: classification, bounds, containment and visibility.
//!
//! A [`Polygon`] is an immutable closed ring of at least three finite
//! points. Its convexity and bounding box are computed once at construction
//! and never go stale: rotation builds a new polygon instead of mutating.

use crate::error::{Error, Result};
use crate::geometry::{
    Metric, ORIENTATION_EPSILON, Orientation, Point, Vector, on_segment, orientation,
};
use crate::rotate::Rotate;
use std::collections::BTreeSet;

/// Longitude the containment ray is cast toward. Far outside any valid
/// coordinate, so the ray always leaves the polygon.
const RAY_LNG: f64 = 1000.0;

/// Vertex indices already used as detour waypoints.
///
/// Owned by the caller of [`Polygon::find_path`], so two searches over the
/// same polygon never share state.
pub type VertexSet = BTreeSet<usize>;

/// Convexity of a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonKind {
    Convex,
    Concave,
}

impl PolygonKind {
    pub fn name(&self) -> &'static str {
        match self {
            PolygonKind::Convex => "convex",
            PolygonKind::Concave => "concave",
        }
    }
}

/// Axis-aligned bounding box in lat/lng.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OuterBound {
    pub center: Point,
    /// Northwest, northeast, southeast, southwest
    pub corners: [Point; 4],
}

impl OuterBound {
    fn of(vertices: &[Point]) -> Self {
        let (mut min_lat, mut max_lat) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_lng, mut max_lng) = (f64::INFINITY, f64::NEG_INFINITY);
        for v in vertices {
            min_lat = min_lat.min(v.lat);
            max_lat = max_lat.max(v.lat);
            min_lng = min_lng.min(v.lng);
            max_lng = max_lng.max(v.lng);
        }

        Self {
            center: Point::new((min_lat + max_lat) / 2.0, (min_lng + max_lng) / 2.0),
            corners: [
                Point::new(max_lat, min_lng),
                Point::new(max_lat, max_lng),
                Point::new(min_lat, max_lng),
                Point::new(min_lat, min_lng),
            ],
        }
    }

    #[inline]
    pub fn north(&self) -> f64 {
        self.corners[0].lat
    }

    #[inline]
    pub fn south(&self) -> f64 {
        self.corners[2].lat
    }

    #[inline]
    pub fn west(&self) -> f64 {
        self.corners[0].lng
    }

    #[inline]
    pub fn east(&self) -> f64 {
        self.corners[1].lng
    }
}

/// Where the sweep lines of a polygon fall.
///
/// Row `i` sits at latitude `top - i * lat_step`, for `i` in `0..rows()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepSpec {
    /// Number of spacing intervals between the north and south edges
    pub lines: usize,
    pub lat_step: f64,
    pub top: f64,
}

impl SweepSpec {
    #[inline]
    pub fn rows(&self) -> usize {
        self.lines + 1
    }

    #[inline]
    pub fn latitude(&self, row: usize) -> f64 {
        self.top - row as f64 * self.lat_step
    }
}

/// A closed simple polygon of geographic points.
///
/// The closing edge from the last vertex back to the first is implicit.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point>,
    kind: PolygonKind,
    bound: OuterBound,
}

impl Polygon {
    /// Validate and classify a boundary.
    pub fn new(vertices: Vec<Point>) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(Error::TooFewVertices {
                count: vertices.len(),
            });
        }
        if let Some(index) = vertices.iter().position(|p| !p.is_finite()) {
            return Err(Error::InvalidCoordinate { index });
        }
        Self::build(vertices)
    }

    fn build(vertices: Vec<Point>) -> Result<Self> {
        let kind = classify(&vertices)?;
        let bound = OuterBound::of(&vertices);
        Ok(Self {
            vertices,
            kind,
            bound,
        })
    }

    #[inline]
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn kind(&self) -> PolygonKind {
        self.kind
    }

    #[inline]
    pub fn is_convex(&self) -> bool {
        self.kind == PolygonKind::Convex
    }

    #[inline]
    pub fn outer_bound(&self) -> &OuterBound {
        &self.bound
    }

    /// Edges in order, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = Vector> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| Vector::between(self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// A copy with every vertex rotated about `center`.
    pub fn rotated(&self, rotator: &dyn Rotate, degrees: f64, center: Point) -> Result<Polygon> {
        Self::build(
            self.vertices
                .iter()
                .map(|v| rotator.rotate(*v, center, degrees))
                .collect(),
        )
    }

    /// How many sweep rows fit and how far apart they are in latitude.
    ///
    /// The north-south extent is measured along the west edge of the bound
    /// with `metric`. `lines = floor(extent / spacing)`. A polygon thinner
    /// than one spacing still gets a single row through its center.
    pub fn sweep_spec(&self, spacing: f64, metric: Metric) -> Result<SweepSpec> {
        if !spacing.is_finite() || spacing <= 0.0 {
            return Err(Error::InvalidSpacing(spacing));
        }

        let [nw, _, _, sw] = self.bound.corners;
        let extent = metric.distance(nw, sw);
        let lines = (extent / spacing).floor() as usize;

        if lines == 0 {
            return Ok(SweepSpec {
                lines: 0,
                lat_step: 0.0,
                top: self.bound.center.lat,
            });
        }

        Ok(SweepSpec {
            lines,
            lat_step: (nw.lat - sw.lat) / lines as f64,
            top: nw.lat,
        })
    }

    /// Point-in-polygon by ray casting toward the east.
    ///
    /// Points on an edge count as inside. Edges running along the ray
    /// (horizontal) are never counted as crossings; the half-open
    /// `(a.lat > lat) != (b.lat > lat)` test also keeps a ray through a
    /// vertex from being counted twice.
    pub fn contains(&self, point: Point) -> bool {
        let n = self.vertices.len();
        let mut inside = false;

        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];

            if orientation(a, b, point) == Orientation::Colinear && on_segment(a, point, b) {
                return true;
            }

            if (a.lat > point.lat) != (b.lat > point.lat) {
                let x = a.lng + (point.lat - a.lat) * (b.lng - a.lng) / (b.lat - a.lat);
                if point.lng < x && x < RAY_LNG {
                    inside = !inside;
                }
            }
        }

        inside
    }

    /// Whether the straight segment `a -> b` stays inside the polygon.
    ///
    /// The segment is blocked if it meets the boundary at more than two
    /// distinct points. Otherwise its midpoint decides. Both endpoints are
    /// expected to lie on the boundary or inside.
    pub fn can_see(&self, a: Point, b: Point) -> bool {
        let sight = Vector::between(a, b);
        let mut hits: Vec<Point> = Vec::new();

        for edge in self.edges() {
            if let Some(p) = sight.segment_intersection(&edge) {
                if !hits.iter().any(|h| h.same_as(p)) {
                    hits.push(p);
                    if hits.len() > 2 {
                        return false;
                    }
                }
            }
        }

        let mid = Point::new((a.lat + b.lat) / 2.0, (a.lng + b.lng) / 2.0);
        self.contains(mid)
    }

    /// Greedy vertex-hopping route from `from` to `to`.
    ///
    /// While `to` is not visible, step to the visible vertex not yet in
    /// `visited` that minimizes `d(cursor, v) + d(v, to)`, and mark it.
    /// Returns `[from, waypoints..., to]`.
    ///
    /// ## Rust Lesson #12: Borrowing Mutable State
    ///
    /// `visited: &mut VertexSet` lets the caller own the bookkeeping. The
    /// polygon stays `&self`, so several searches can run over the same
    /// boundary at once.
    pub fn find_path(
        &self,
        from: Point,
        to: Point,
        visited: &mut VertexSet,
        metric: Metric,
    ) -> Result<Vec<Point>> {
        let mut path = vec![from];
        let mut cursor = from;

        while !self.can_see(cursor, to) {
            let next = self
                .vertices
                .iter()
                .enumerate()
                .filter(|(i, v)| {
                    !visited.contains(i) && !v.same_as(cursor) && self.can_see(cursor, **v)
                })
                .map(|(i, v)| (i, *v, metric.distance(cursor, *v) + metric.distance(*v, to)))
                .min_by(|a, b| a.2.total_cmp(&b.2));

            let Some((index, vertex, _)) = next else {
                return Err(Error::PathfindingExhausted { from, to });
            };

            log::trace!("detour via vertex {} ({:.7}, {:.7})", index, vertex.lat, vertex.lng);
            visited.insert(index);
            path.push(vertex);
            cursor = vertex;
        }

        path.push(to);
        Ok(path)
    }
}

/// Convex iff the turn direction never flips sign around the ring.
///
/// Each turn is `(e_i × e_{i+1}) · ẑ` with the edges lifted into the
/// z = 0 plane. Near-zero turns (relative to the edge lengths) are
/// straight and do not reset the running sign.
fn classify(vertices: &[Point]) -> Result<PolygonKind> {
    let n = vertices.len();
    let up = Vector::from_origin(vec![0.0, 0.0, 1.0])?;
    let mut last_sign = 0.0_f64;

    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        let c = vertices[(i + 2) % n];

        let e1 = Vector::lifted(a, b);
        let e2 = Vector::lifted(b, c);
        let turn = e1.cross(&e2)?.dot(&up)?;

        let scale = a.planar_distance(b) * b.planar_distance(c);
        if scale == 0.0 || (turn / scale).abs() < ORIENTATION_EPSILON {
            continue;
        }

        let sign = turn.signum();
        if last_sign != 0.0 && sign != last_sign {
            return Ok(PolygonKind::Concave);
        }
        last_sign = sign;
    }

    Ok(PolygonKind::Convex)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotate::PlanarRotation;

    fn xy(points: &[(f64, f64)]) -> Vec<Point> {
        points.iter().map(|&(x, y)| Point::from_xy(x, y)).collect()
    }

    fn square() -> Polygon {
        Polygon::new(xy(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)])).unwrap()
    }

    /// L-shape: a 2x2 square with the top-right quadrant removed.
    fn l_shape() -> Polygon {
        Polygon::new(xy(&[
            (0.0, 0.0),
            (2.0, 0.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 2.0),
            (0.0, 2.0),
        ]))
        .unwrap()
    }

    #[test]
    fn rejects_bad_input() {
        let two = Polygon::new(xy(&[(0.0, 0.0), (1.0, 1.0)]));
        assert!(matches!(two, Err(Error::TooFewVertices { count: 2 })));

        let nan = Polygon::new(xy(&[(0.0, 0.0), (f64::NAN, 1.0), (1.0, 0.0)]));
        assert!(matches!(nan, Err(Error::InvalidCoordinate { index: 1 })));
    }

    #[test]
    fn classifies_convexity() {
        assert_eq!(square().kind(), PolygonKind::Convex);
        assert_eq!(l_shape().kind(), PolygonKind::Concave);

        // Winding direction does not matter
        let mut cw = square().vertices().to_vec();
        cw.reverse();
        assert!(Polygon::new(cw).unwrap().is_convex());
    }

    #[test]
    fn straight_vertices_stay_convex() {
        let p = Polygon::new(xy(&[(0.0, 0.0), (5.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]))
            .unwrap();
        assert!(p.is_convex());
    }

    #[test]
    fn outer_bound_corners() {
        let b = *l_shape().outer_bound();
        assert_eq!(b.center, Point::new(1.0, 1.0));
        assert_eq!(b.corners[0], Point::new(2.0, 0.0));
        assert_eq!(b.corners[2], Point::new(0.0, 2.0));
        assert_eq!((b.north(), b.south(), b.west(), b.east()), (2.0, 0.0, 0.0, 2.0));
    }

    #[test]
    fn sweep_spec_counts_rows() {
        let spec = square().sweep_spec(2.0, Metric::Planar).unwrap();
        assert_eq!(spec.lines, 5);
        assert_eq!(spec.rows(), 6);
        assert!((spec.lat_step - 2.0).abs() < 1e-12);
        assert_eq!(spec.latitude(0), 10.0);
        assert_eq!(spec.latitude(5), 0.0);
    }

    #[test]
    fn thin_polygon_gets_center_row() {
        let spec = square().sweep_spec(50.0, Metric::Planar).unwrap();
        assert_eq!(spec.rows(), 1);
        assert_eq!(spec.latitude(0), 5.0);
    }

    #[test]
    fn sweep_spec_rejects_bad_spacing() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                square().sweep_spec(bad, Metric::Planar),
                Err(Error::InvalidSpacing(_))
            ));
        }
    }

    #[test]
    fn haversine_rows_follow_meters() {
        // 0.01 deg of latitude is about 1112 m
        let field = Polygon::new(vec![
            Point::new(30.0, 120.0),
            Point::new(30.0, 120.01),
            Point::new(30.01, 120.01),
            Point::new(30.01, 120.0),
        ])
        .unwrap();
        let spec = field.sweep_spec(100.0, Metric::Haversine).unwrap();
        assert_eq!(spec.lines, 11);
    }

    #[test]
    fn containment() {
        let l = l_shape();
        assert!(l.contains(Point::from_xy(0.5, 0.5)));
        assert!(l.contains(Point::from_xy(0.5, 1.5)));
        assert!(!l.contains(Point::from_xy(1.5, 1.5)));
        assert!(!l.contains(Point::from_xy(3.0, 0.5)));
        // Boundary counts as inside
        assert!(l.contains(Point::from_xy(2.0, 0.5)));
        assert!(l.contains(Point::from_xy(1.0, 1.0)));
        // Ray through a vertex
        assert!(l.contains(Point::from_xy(0.5, 1.0)));
    }

    #[test]
    fn visibility_inside_and_across_notch() {
        let l = l_shape();
        assert!(l.can_see(Point::from_xy(0.0, 0.5), Point::from_xy(2.0, 0.5)));
        assert!(l.can_see(Point::from_xy(0.5, 2.0), Point::from_xy(0.5, 0.0)));
        // Cuts across the missing quadrant
        assert!(!l.can_see(Point::from_xy(1.0, 1.8), Point::from_xy(2.0, 0.8)));
        // Along an edge
        assert!(l.can_see(Point::from_xy(0.0, 0.0), Point::from_xy(2.0, 0.0)));
    }

    #[test]
    fn visibility_is_symmetric() {
        let l = l_shape();
        let a = Point::from_xy(1.0, 1.8);
        let b = Point::from_xy(2.0, 0.8);
        let c = Point::from_xy(0.0, 0.4);
        assert_eq!(l.can_see(a, b), l.can_see(b, a));
        assert_eq!(l.can_see(a, c), l.can_see(c, a));
    }

    #[test]
    fn path_detours_through_reflex_vertex() {
        let l = l_shape();
        let from = Point::from_xy(1.0, 1.3);
        let to = Point::from_xy(2.0, 0.8);
        let mut visited = VertexSet::new();
        let path = l.find_path(from, to, &mut visited, Metric::Planar).unwrap();

        assert_eq!(path.first(), Some(&from));
        assert_eq!(path.last(), Some(&to));
        assert_eq!(path[1], Point::from_xy(1.0, 1.0));
        for leg in path.windows(2) {
            assert!(l.can_see(leg[0], leg[1]));
        }
        assert!(visited.contains(&3));
    }

    #[test]
    fn direct_path_when_visible() {
        let mut visited = VertexSet::new();
        let a = Point::from_xy(1.0, 1.0);
        let b = Point::from_xy(9.0, 9.0);
        let path = square().find_path(a, b, &mut visited, Metric::Planar).unwrap();
        assert_eq!(path, vec![a, b]);
        assert!(visited.is_empty());
    }

    #[test]
    fn exhausted_when_every_vertex_is_used() {
        let l = l_shape();
        let mut visited: VertexSet = (0..l.vertex_count()).collect();
        let result = l.find_path(
            Point::from_xy(1.0, 1.8),
            Point::from_xy(2.0, 0.8),
            &mut visited,
            Metric::Planar,
        );
        assert!(matches!(result, Err(Error::PathfindingExhausted { .. })));
    }

    #[test]
    fn rotation_rebuilds_bound() {
        let sq = square();
        let center = sq.outer_bound().center;
        let turned = sq.rotated(&PlanarRotation, 45.0, center).unwrap();
        let b = turned.outer_bound();
        let half_diag = 50.0_f64.sqrt();
        assert!((b.north() - (5.0 + half_diag)).abs() < 1e-9);
        assert!(turned.is_convex());
    }
}
