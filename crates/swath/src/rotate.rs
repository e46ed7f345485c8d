//! Rotation of geographic points about a center.
//!
//! The planner sweeps along latitude lines only, so any other sweep
//! orientation is done by rotating the field, sweeping, and rotating the
//! route back. How the rotation happens depends on which coordinate system
//! is authoritative:
//!
//! - [`LocalRotation`] rotates in a local frame where a degree of
//!   longitude is shrunk by `cos(lat)`, so ground distances survive the
//!   turn (the default for lat/lng fields)
//! - [`PlanarRotation`] rotates lat/lng directly with trigonometry, for
//!   coordinates that already are a flat grid
//! - [`ProjectedRotation`] projects to screen pixels, rotates there, and
//!   unprojects (what a map SDK would do)
//!
//! Both sit behind the same [`Rotate`] trait, and so does any closure with
//! the signature `Fn(Point, Point, f64) -> Point`.

use crate::geometry::{Metric, Point};
use crate::render::{Pixel, Projection, WebMercator};

/// Zoom of the Web Mercator frame behind [`RotationKind::Mercator`].
/// Rotation in pixel space does not depend on it; it only keeps pixel
/// offsets near the field in a comfortable range.
const MERCATOR_ROTATION_ZOOM: f64 = 18.0;

/// Rotate `point` about `center` by `degrees` (counter-clockwise on a
/// north-up map, taken modulo 360).
pub trait Rotate {
    fn rotate(&self, point: Point, center: Point, degrees: f64) -> Point;
}

/// ## Rust Lesson #5: Blanket Implementations
///
/// `impl<F> Rotate for F where F: Fn(...)` makes every matching closure a
/// `Rotate` - callers can inject a one-off rotation without declaring a
/// type for it.
impl<F> Rotate for F
where
    F: Fn(Point, Point, f64) -> Point,
{
    fn rotate(&self, point: Point, center: Point, degrees: f64) -> Point {
        self(point, center, degrees)
    }
}

/// Direct trigonometric rotation with `x = lng`, `y = lat`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanarRotation;

impl Rotate for PlanarRotation {
    fn rotate(&self, point: Point, center: Point, degrees: f64) -> Point {
        let (x, y) = rotate_xy(
            point.lng - center.lng,
            point.lat - center.lat,
            degrees,
        );
        Point::from_xy(center.lng + x, center.lat + y)
    }
}

/// Equirectangular rotation about the center.
///
/// Longitude offsets are scaled by `cos(center.lat)` before turning and
/// unscaled after, which makes the frame locally isotropic: sweep rows
/// spaced `d` meters apart stay `d` meters apart at any heading.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalRotation;

impl Rotate for LocalRotation {
    fn rotate(&self, point: Point, center: Point, degrees: f64) -> Point {
        if degrees.rem_euclid(360.0) == 0.0 {
            return point;
        }

        let k = center.lat.to_radians().cos();
        if k < f64::EPSILON {
            return PlanarRotation.rotate(point, center, degrees);
        }

        let (x, y) = rotate_xy(
            (point.lng - center.lng) * k,
            point.lat - center.lat,
            degrees,
        );
        Point::from_xy(center.lng + x / k, center.lat + y)
    }
}

/// Rotation performed in the pixel space of a projection.
///
/// Screen y grows downward, so the angle is negated to keep the rotation
/// counter-clockwise on the map.
#[derive(Debug, Clone)]
pub struct ProjectedRotation<P: Projection> {
    projection: P,
}

impl<P: Projection> ProjectedRotation<P> {
    pub fn new(projection: P) -> Self {
        Self { projection }
    }
}

impl<P: Projection> Rotate for ProjectedRotation<P> {
    fn rotate(&self, point: Point, center: Point, degrees: f64) -> Point {
        let p = self.projection.project(point);
        let c = self.projection.project(center);
        let (x, y) = rotate_xy(p.x - c.x, p.y - c.y, -degrees);
        self.projection.unproject(Pixel::new(c.x + x, c.y + y))
    }
}

/// The built-in rotations, by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationKind {
    Local,
    Planar,
    Mercator,
}

impl RotationKind {
    pub fn name(&self) -> &'static str {
        match self {
            RotationKind::Local => "local",
            RotationKind::Planar => "planar",
            RotationKind::Mercator => "mercator",
        }
    }

    pub fn from_name(name: &str) -> Option<RotationKind> {
        match name.to_lowercase().as_str() {
            "local" | "equirectangular" => Some(RotationKind::Local),
            "planar" | "flat" => Some(RotationKind::Planar),
            "mercator" | "projected" => Some(RotationKind::Mercator),
            _ => None,
        }
    }

    pub fn all() -> &'static [RotationKind] {
        &[RotationKind::Local, RotationKind::Planar, RotationKind::Mercator]
    }

    /// The rotation that keeps `metric` distances intact.
    pub fn for_metric(metric: Metric) -> RotationKind {
        match metric {
            Metric::Haversine => RotationKind::Local,
            Metric::Planar => RotationKind::Planar,
        }
    }

    /// Build the rotator. `anchor` places the Mercator frame and is
    /// ignored by the others.
    pub fn rotator(&self, anchor: Point) -> Box<dyn Rotate> {
        match self {
            RotationKind::Local => Box::new(LocalRotation),
            RotationKind::Planar => Box::new(PlanarRotation),
            RotationKind::Mercator => Box::new(ProjectedRotation::new(WebMercator::new(
                MERCATOR_ROTATION_ZOOM,
                anchor,
            ))),
        }
    }
}

/// Rotate the offset `(x, y)` by `degrees`.
fn rotate_xy(x: f64, y: f64, degrees: f64) -> (f64, f64) {
    let (sin, cos) = degrees.rem_euclid(360.0).to_radians().sin_cos();
    (x * cos - y * sin, x * sin + y * cos)
}

/// Rotate every point about the same center.
pub fn rotate_points(
    rotator: &dyn Rotate,
    points: &[Point],
    center: Point,
    degrees: f64,
) -> Vec<Point> {
    points
        .iter()
        .map(|p| rotator.rotate(*p, center, degrees))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::WebMercator;

    fn close(a: Point, b: Point, eps: f64) -> bool {
        (a.lat - b.lat).abs() < eps && (a.lng - b.lng).abs() < eps
    }

    #[test]
    fn quarter_turn_is_counter_clockwise() {
        let center = Point::new(0.0, 0.0);
        let east = Point::new(0.0, 1.0);
        let north = PlanarRotation.rotate(east, center, 90.0);
        assert!(close(north, Point::new(1.0, 0.0), 1e-12), "got {:?}", north);
    }

    #[test]
    fn angles_wrap_modulo_360() {
        let center = Point::new(30.0, 120.0);
        let p = Point::new(30.001, 120.002);
        let a = PlanarRotation.rotate(p, center, 45.0);
        let b = PlanarRotation.rotate(p, center, 405.0);
        let c = PlanarRotation.rotate(p, center, -315.0);
        assert!(close(a, b, 1e-12));
        assert!(close(a, c, 1e-12));
    }

    #[test]
    fn projected_rotation_round_trips() {
        let rotation = ProjectedRotation::new(WebMercator::new(17.0, Point::new(30.3, 120.1)));
        let center = Point::new(30.25, 120.15);
        let p = Point::new(30.2512, 120.1534);
        let there = rotation.rotate(p, center, 33.0);
        let back = rotation.rotate(there, center, -33.0);
        assert!(close(back, p, 1e-9), "got {:?}", back);
    }

    #[test]
    fn projected_and_planar_agree_on_direction() {
        // Near the equator Mercator is close to planar, so both should turn
        // east into north.
        let projected = ProjectedRotation::new(WebMercator::new(10.0, Point::new(1.0, -1.0)));
        let center = Point::new(0.0, 0.0);
        let east = Point::new(0.0, 0.01);
        let turned = projected.rotate(east, center, 90.0);
        assert!(turned.lat > 0.009, "got {:?}", turned);
        assert!(turned.lng.abs() < 1e-6, "got {:?}", turned);
    }

    #[test]
    fn local_rotation_keeps_ground_distance() {
        let center = Point::new(44.48, -73.21);
        let north = Point::new(44.481, -73.21);
        let d = center.distance_on_earth(north);

        for degrees in [30.0, 90.0, 135.0, 270.0] {
            let turned = LocalRotation.rotate(north, center, degrees);
            let got = center.distance_on_earth(turned);
            assert!((got - d).abs() < 0.01 * d, "{} deg: {} m vs {} m", degrees, got, d);
        }

        // Planar rotation at this latitude stretches a quarter turn
        let planar = PlanarRotation.rotate(north, center, 90.0);
        assert!(center.distance_on_earth(planar) < 0.8 * d);
    }

    #[test]
    fn local_rotation_round_trips() {
        let center = Point::new(44.48, -73.21);
        let p = Point::new(44.4812, -73.2087);
        let back = LocalRotation.rotate(LocalRotation.rotate(p, center, 57.0), center, -57.0);
        assert!(close(back, p, 1e-12), "got {:?}", back);
        assert_eq!(LocalRotation.rotate(p, center, 360.0), p);
    }

    #[test]
    fn rotation_kinds() {
        assert_eq!(RotationKind::for_metric(Metric::Haversine), RotationKind::Local);
        assert_eq!(RotationKind::for_metric(Metric::Planar), RotationKind::Planar);
        for kind in RotationKind::all() {
            assert_eq!(RotationKind::from_name(kind.name()), Some(*kind));
        }
        assert_eq!(RotationKind::from_name("spin"), None);

        let anchor = Point::new(44.48, -73.21);
        let p = Point::new(44.481, -73.21);
        let turned = RotationKind::Mercator.rotator(anchor).rotate(p, anchor, 90.0);
        let local = RotationKind::Local.rotator(anchor).rotate(p, anchor, 90.0);
        assert!(close(turned, local, 1e-6), "{:?} vs {:?}", turned, local);
    }

    #[test]
    fn closures_are_rotators() {
        let identity = |p: Point, _c: Point, _d: f64| p;
        let p = Point::new(1.0, 2.0);
        assert_eq!(rotate_points(&identity, &[p], p, 90.0), vec![p]);
    }
}
