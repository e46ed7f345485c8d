//! The coverage planner: boundary in, waypoints out.
//!
//! ## Modes
//!
//! - **Simple**: split concave fields into convex parts and fly a
//!   lawnmower pattern over each part in turn
//! - **Stitched**: sweep the whole field at once and join rows with
//!   detours where a straight leg would leave it
//! - **IntersectionsOnly**: the raw row crossings, for debugging and
//!   visualization
//!
//! Every mode rotates the field by `-rotation` about the center of its
//! bounding box, sweeps along latitude lines, and rotates the result back
//! by `+rotation`, so `rotation` is the heading of the sweep lines.
//! Unless a rotator is injected, the rotation follows the metric: a
//! [`RotationKind::Local`] turn for haversine fields, so spacing stays in
//! meters at every heading, and a flat turn for planar ones.

use crate::decompose::{Decompose, ReflexSplitDecomposer};
use crate::detour::{DetourStrategy, GreedyDetour};
use crate::error::Result;
use crate::geometry::{Metric, Point};
use crate::order::{OrderingStrategy, order_parts};
use crate::polygon::Polygon;
use crate::rotate::{Rotate, RotationKind, rotate_points};
use crate::stitch::stitch_rows;
use crate::sweep::{SweepRow, sweep_rows};

/// Which planning pipeline to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanMode {
    Simple,
    #[default]
    Stitched,
    IntersectionsOnly,
}

impl PlanMode {
    pub fn name(&self) -> &'static str {
        match self {
            PlanMode::Simple => "simple",
            PlanMode::Stitched => "stitched",
            PlanMode::IntersectionsOnly => "intersections",
        }
    }

    pub fn from_name(name: &str) -> Option<PlanMode> {
        match name.to_lowercase().as_str() {
            "simple" | "decompose" => Some(PlanMode::Simple),
            "stitched" | "stitch" | "whole" => Some(PlanMode::Stitched),
            "intersections" | "intersections-only" | "rows" => Some(PlanMode::IntersectionsOnly),
            _ => None,
        }
    }

    pub fn all() -> &'static [PlanMode] {
        &[PlanMode::Simple, PlanMode::Stitched, PlanMode::IntersectionsOnly]
    }

    /// One-line description for `swath modes`.
    pub fn description(&self) -> &'static str {
        match self {
            PlanMode::Simple => "convex decomposition, one lawnmower per part",
            PlanMode::Stitched => "whole-field sweep, rows joined with detours",
            PlanMode::IntersectionsOnly => "raw sweep-row crossings, no path",
        }
    }
}

/// Coverage planner with pluggable collaborators.
///
/// ## Rust Lesson #14: Builder Methods
///
/// Each `with_*` method takes `self` by value and returns it, so a planner
/// is configured in one expression:
///
/// ```
/// use swath::{Metric, OrderingStrategy, Planner};
///
/// let planner = Planner::new()
///     .with_metric(Metric::Planar)
///     .with_ordering(OrderingStrategy::Document);
/// assert_eq!(planner.metric(), Metric::Planar);
/// ```
pub struct Planner {
    rotator: Option<Box<dyn Rotate>>,
    rotation: Option<RotationKind>,
    decomposer: Box<dyn Decompose>,
    detour: Box<dyn DetourStrategy>,
    metric: Metric,
    ordering: OrderingStrategy,
}

impl Default for Planner {
    fn default() -> Self {
        Self {
            rotator: None,
            rotation: None,
            decomposer: Box::new(ReflexSplitDecomposer),
            detour: Box::new(GreedyDetour),
            metric: Metric::default(),
            ordering: OrderingStrategy::NearestNeighbor,
        }
    }
}

impl std::fmt::Debug for Planner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Planner")
            .field("rotation", &self.rotation_name())
            .field("detour", &self.detour.name())
            .field("metric", &self.metric)
            .field("ordering", &self.ordering)
            .finish_non_exhaustive()
    }
}

impl Planner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom rotation, e.g. one backed by a map SDK's projection.
    pub fn with_rotator(mut self, rotator: impl Rotate + 'static) -> Self {
        self.rotator = Some(Box::new(rotator));
        self
    }

    /// Use one of the built-in rotations instead of the metric's default.
    pub fn with_rotation(mut self, kind: RotationKind) -> Self {
        self.rotation = Some(kind);
        self.rotator = None;
        self
    }

    pub fn with_decomposer(mut self, decomposer: impl Decompose + 'static) -> Self {
        self.decomposer = Box::new(decomposer);
        self
    }

    pub fn with_detour(mut self, detour: Box<dyn DetourStrategy>) -> Self {
        self.detour = detour;
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_ordering(mut self, ordering: OrderingStrategy) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn ordering(&self) -> OrderingStrategy {
        self.ordering
    }

    pub fn detour_name(&self) -> &'static str {
        self.detour.name()
    }

    /// The built-in rotation in use, `None` when a custom rotator is set.
    pub fn rotation(&self) -> Option<RotationKind> {
        match self.rotator {
            Some(_) => None,
            None => Some(self.builtin_rotation()),
        }
    }

    pub fn rotation_name(&self) -> &'static str {
        self.rotation().map_or("custom", |kind| kind.name())
    }

    fn builtin_rotation(&self) -> RotationKind {
        self.rotation
            .unwrap_or_else(|| RotationKind::for_metric(self.metric))
    }

    /// The rotator for a field centered on `anchor`.
    fn rotator_for(&self, anchor: Point) -> Box<dyn Rotate + '_> {
        match &self.rotator {
            Some(custom) => Box::new(move |p: Point, c: Point, d: f64| (**custom).rotate(p, c, d)),
            None => self.builtin_rotation().rotator(anchor),
        }
    }

    /// Plan a route over `boundary`.
    ///
    /// `spacing` is the distance between sweep lines in the planner's
    /// metric (meters for haversine). `rotation` is in degrees.
    pub fn plan(
        &self,
        boundary: &[Point],
        spacing: f64,
        rotation: f64,
        mode: PlanMode,
    ) -> Result<Vec<Point>> {
        let polygon = Polygon::new(boundary.to_vec())?;
        log::debug!(
            "planning {} field with {} vertices, mode {}",
            polygon.kind().name(),
            polygon.vertex_count(),
            mode.name()
        );

        let route = match mode {
            PlanMode::Simple => self.plan_simple(&polygon, spacing, rotation)?,
            PlanMode::Stitched => self.plan_stitched(&polygon, spacing, rotation)?,
            PlanMode::IntersectionsOnly => self
                .intersection_rows(&polygon, spacing, rotation)?
                .into_iter()
                .flat_map(|row| row.points)
                .collect(),
        };

        log::info!("planned {} waypoints ({})", route.len(), mode.name());
        Ok(route)
    }

    /// Lawnmower over one convex polygon.
    ///
    /// Each row contributes its west and east crossings, alternating
    /// direction from one emitted row to the next.
    pub fn plan_convex(&self, polygon: &Polygon, spacing: f64, rotation: f64) -> Result<Vec<Point>> {
        let center = polygon.outer_bound().center;
        let rotator = self.rotator_for(center);
        let rotated = polygon.rotated(&*rotator, -rotation, center)?;
        let spec = rotated.sweep_spec(spacing, self.metric)?;

        let mut route = Vec::with_capacity(2 * spec.rows());
        for (leg, row) in sweep_rows(&rotated, &spec).iter().enumerate() {
            let (Some(&west), Some(&east)) = (row.points.first(), row.points.last()) else {
                continue;
            };
            if leg % 2 == 0 {
                route.extend([west, east]);
            } else {
                route.extend([east, west]);
            }
        }

        Ok(rotate_points(&*rotator, &route, center, rotation))
    }

    /// Decompose if needed, then fly each convex part in turn.
    pub fn plan_simple(&self, polygon: &Polygon, spacing: f64, rotation: f64) -> Result<Vec<Point>> {
        if polygon.is_convex() {
            return self.plan_convex(polygon, spacing, rotation);
        }

        let parts = self.decompose(polygon)?;
        let order = order_parts(&parts, self.ordering, self.metric);

        let mut route = Vec::new();
        for i in order {
            route.extend(self.plan_convex(&parts[i], spacing, rotation)?);
        }
        Ok(route)
    }

    /// Sweep the whole polygon and stitch rows into one route.
    pub fn plan_stitched(&self, polygon: &Polygon, spacing: f64, rotation: f64) -> Result<Vec<Point>> {
        let center = polygon.outer_bound().center;
        let rotator = self.rotator_for(center);
        let rotated = polygon.rotated(&*rotator, -rotation, center)?;
        let spec = rotated.sweep_spec(spacing, self.metric)?;
        let rows = sweep_rows(&rotated, &spec);
        log::debug!("{} of {} sweep rows cross the field", rows.len(), spec.rows());

        let route = stitch_rows(&rotated, &rows, self.detour.as_ref(), self.metric)?;
        Ok(rotate_points(&*rotator, &route, center, rotation))
    }

    /// Sweep rows of the whole polygon, rotated back into place.
    pub fn intersection_rows(
        &self,
        polygon: &Polygon,
        spacing: f64,
        rotation: f64,
    ) -> Result<Vec<SweepRow>> {
        let center = polygon.outer_bound().center;
        let rotator = self.rotator_for(center);
        let rotated = polygon.rotated(&*rotator, -rotation, center)?;
        let spec = rotated.sweep_spec(spacing, self.metric)?;

        Ok(sweep_rows(&rotated, &spec)
            .into_iter()
            .map(|row| SweepRow {
                points: rotate_points(&*rotator, &row.points, center, rotation),
                ..row
            })
            .collect())
    }

    /// Convex parts of `polygon` from the configured decomposer.
    pub fn decompose(&self, polygon: &Polygon) -> Result<Vec<Polygon>> {
        if polygon.is_convex() {
            return Ok(vec![polygon.clone()]);
        }
        self.decomposer
            .decompose(polygon.vertices())?
            .into_iter()
            .map(Polygon::new)
            .collect()
    }
}

/// Plan with the default planner: haversine metric with the local
/// rotation, greedy detours and nearest-neighbor part order.
pub fn plan_coverage(
    boundary: &[Point],
    spacing: f64,
    rotation: f64,
    mode: PlanMode,
) -> Result<Vec<Point>> {
    Planner::default().plan(boundary, spacing, rotation, mode)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::render::WebMercator;
    use crate::rotate::{PlanarRotation, ProjectedRotation};

    fn xy(points: &[(f64, f64)]) -> Vec<Point> {
        points.iter().map(|&(x, y)| Point::from_xy(x, y)).collect()
    }

    fn square() -> Vec<Point> {
        xy(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)])
    }

    fn planar() -> Planner {
        Planner::new().with_metric(Metric::Planar)
    }

    #[test]
    fn square_lawnmower() {
        let route = planar().plan(&square(), 2.0, 0.0, PlanMode::Simple).unwrap();
        let expected = xy(&[
            (0.0, 10.0),
            (10.0, 10.0),
            (10.0, 8.0),
            (0.0, 8.0),
            (0.0, 6.0),
            (10.0, 6.0),
            (10.0, 4.0),
            (0.0, 4.0),
            (0.0, 2.0),
            (10.0, 2.0),
        ]);
        assert_eq!(route.len(), expected.len());
        for (got, want) in route.iter().zip(&expected) {
            assert!(got.approx_eq(*want, 1e-9), "got {:?}, want {:?}", got, want);
        }
    }

    #[test]
    fn convex_modes_agree() {
        let simple = planar().plan(&square(), 2.0, 0.0, PlanMode::Simple).unwrap();
        let stitched = planar().plan(&square(), 2.0, 0.0, PlanMode::Stitched).unwrap();
        assert_eq!(simple, stitched);
    }

    #[test]
    fn rotation_keeps_waypoints_on_boundary() {
        let sq = Polygon::new(square()).unwrap();
        let route = planar().plan(&square(), 1.0, 30.0, PlanMode::Stitched).unwrap();
        assert!(!route.is_empty());
        for p in &route {
            assert!(p.lng > -1e-6 && p.lng < 10.0 + 1e-6, "{:?}", p);
            assert!(p.lat > -1e-6 && p.lat < 10.0 + 1e-6, "{:?}", p);
        }
        // Legs alternate along the rotated heading
        let heading = (route[1].lat - route[0].lat).atan2(route[1].lng - route[0].lng);
        assert!((heading.to_degrees().rem_euclid(180.0) - 30.0).abs() < 1e-6);
        assert!(route.windows(2).all(|w| sq.can_see(w[0], w[1])));
    }

    #[test]
    fn intersections_only_is_row_points() {
        let rows = planar()
            .intersection_rows(&Polygon::new(square()).unwrap(), 2.0, 0.0)
            .unwrap();
        let flat = planar().plan(&square(), 2.0, 0.0, PlanMode::IntersectionsOnly).unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(flat.len(), 10);
        // West to east in every row
        assert_eq!(flat[2], Point::from_xy(0.0, 8.0));
    }

    #[test]
    fn l_shape_simple_covers_both_parts() {
        let l = xy(&[(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0), (1.0, 2.0), (0.0, 2.0)]);
        let planner = planar();
        let parts = planner.decompose(&Polygon::new(l.clone()).unwrap()).unwrap();
        assert_eq!(parts.len(), 2);

        let route = planner.plan(&l, 0.25, 0.0, PlanMode::Simple).unwrap();
        let field = Polygon::new(l).unwrap();
        assert!(route.iter().all(|p| field.contains(*p)));
        assert_eq!(route.len() % 2, 0);
    }

    #[test]
    fn l_shape_stitched_stays_inside() {
        let l = xy(&[(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0), (1.0, 2.0), (0.0, 2.0)]);
        let field = Polygon::new(l.clone()).unwrap();
        let route = planar().plan(&l, 0.35, 0.0, PlanMode::Stitched).unwrap();

        for leg in route.windows(2) {
            assert!(field.can_see(leg[0], leg[1]), "leg {:?} leaves the field", leg);
        }
        for (i, a) in route.iter().enumerate() {
            assert!(route[i + 1..].iter().all(|b| !a.same_as(*b)), "duplicate {:?}", a);
        }
    }

    #[test]
    fn rotated_l_shape_repeats_only_corners() {
        let l = xy(&[(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0), (1.0, 2.0), (0.0, 2.0)]);
        let field = Polygon::new(l.clone()).unwrap();

        for (angle, spacing) in [(120.0, 0.4), (135.0, 0.25)] {
            let planner = planar();
            let route = planner.plan(&l, spacing, angle, PlanMode::Stitched).unwrap();
            let rows = planner.intersection_rows(&field, spacing, angle).unwrap();

            for leg in route.windows(2) {
                assert!(field.can_see(leg[0], leg[1]), "{} deg: leg {:?} leaves the field", angle, leg);
            }
            for p in rows.iter().flat_map(|r| &r.points) {
                assert!(route.iter().any(|q| q.same_as(*p)), "{} deg: {:?} never flown", angle, p);
            }
            // A detour may round the same corner on two passes, nothing else repeats
            for (i, a) in route.iter().enumerate() {
                if route[i + 1..].iter().any(|b| a.same_as(*b)) {
                    assert!(l.iter().any(|v| v.same_as(*a)), "{} deg: {:?} repeated", angle, a);
                }
            }
        }
    }

    fn distance_to_boundary(field: &Polygon, p: Point) -> f64 {
        field
            .edges()
            .filter_map(|e| e.as_segment())
            .map(|(a, b)| {
                let (dx, dy) = (b.lng - a.lng, b.lat - a.lat);
                let t = (((p.lng - a.lng) * dx + (p.lat - a.lat) * dy) / (dx * dx + dy * dy))
                    .clamp(0.0, 1.0);
                p.planar_distance(Point::from_xy(a.lng + t * dx, a.lat + t * dy))
            })
            .fold(f64::INFINITY, f64::min)
    }

    fn plot() -> Vec<Point> {
        vec![
            Point::new(44.4800, -73.2100),
            Point::new(44.4800, -73.2087),
            Point::new(44.4791, -73.2087),
            Point::new(44.4791, -73.2100),
        ]
    }

    #[test]
    fn injected_projection_rotation() {
        let field = Polygon::new(plot()).unwrap();
        let projection = WebMercator::new(18.0, plot()[0]);
        let planner = Planner::new().with_rotator(ProjectedRotation::new(projection));
        assert_eq!(planner.rotation(), None);
        assert_eq!(planner.rotation_name(), "custom");

        let route = planner.plan(&plot(), 10.0, 30.0, PlanMode::Stitched).unwrap();
        let rows = planner.intersection_rows(&field, 10.0, 30.0).unwrap();
        assert!(route.len() >= 8);
        assert_eq!(route.len(), rows.iter().map(|r| r.points.len()).sum::<usize>());
        for p in &route {
            assert!(distance_to_boundary(&field, *p) < 1e-9, "{:?} is off the fence", p);
        }
        assert!(route.windows(2).all(|w| field.can_see(w[0], w[1])));
    }

    #[test]
    fn closure_rotator_matches_builtin() {
        let turn = |p: Point, c: Point, d: f64| PlanarRotation.rotate(p, c, d);
        let with_closure = planar()
            .with_rotator(turn)
            .plan(&square(), 1.0, 30.0, PlanMode::Stitched)
            .unwrap();
        let builtin = planar()
            .with_rotation(RotationKind::Planar)
            .plan(&square(), 1.0, 30.0, PlanMode::Stitched)
            .unwrap();
        assert_eq!(with_closure, builtin);

        let field = Polygon::new(square()).unwrap();
        for p in &with_closure {
            assert!(distance_to_boundary(&field, *p) < 1e-9, "{:?} is off the fence", p);
        }
    }

    #[test]
    fn rotation_follows_metric() {
        assert_eq!(Planner::new().rotation(), Some(RotationKind::Local));
        assert_eq!(planar().rotation(), Some(RotationKind::Planar));
        let pinned = Planner::new()
            .with_rotation(RotationKind::Mercator)
            .with_metric(Metric::Planar);
        assert_eq!(pinned.rotation(), Some(RotationKind::Mercator));
    }

    #[test]
    fn thin_field_gets_one_row() {
        let strip = xy(&[(0.0, 0.0), (10.0, 0.0), (10.0, 1.0), (0.0, 1.0)]);
        let route = planar().plan(&strip, 5.0, 0.0, PlanMode::Simple).unwrap();
        assert_eq!(route, xy(&[(0.0, 0.5), (10.0, 0.5)]));
    }

    #[test]
    fn errors_surface() {
        let two = xy(&[(0.0, 0.0), (1.0, 1.0)]);
        assert!(matches!(
            plan_coverage(&two, 10.0, 0.0, PlanMode::Simple),
            Err(Error::TooFewVertices { count: 2 })
        ));
        assert!(matches!(
            plan_coverage(&square(), 0.0, 0.0, PlanMode::Stitched),
            Err(Error::InvalidSpacing(_))
        ));
    }

    #[test]
    fn failing_decomposer_is_reported() {
        let l = xy(&[(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0), (1.0, 2.0), (0.0, 2.0)]);
        let planner = planar().with_decomposer(|_: &[Point]| -> Result<Vec<Vec<Point>>> {
            Err(Error::Decomposition("service unavailable".into()))
        });
        let err = planner.plan(&l, 0.5, 0.0, PlanMode::Simple).unwrap_err();
        assert_eq!(err.stage(), crate::error::Stage::Decomposition);
    }

    #[test]
    fn mode_names() {
        for mode in PlanMode::all() {
            assert_eq!(PlanMode::from_name(mode.name()), Some(*mode));
            assert!(!mode.description().is_empty());
        }
        assert_eq!(PlanMode::default(), PlanMode::Stitched);
    }
}
