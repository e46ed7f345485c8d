//! End-to-end planning on a real-world sized field.
//!
//! The paddock is an L: a strip along the north fence and a leg running
//! south on the west side, about 200 m across.

use swath::{
    DetourKind, Metric, PlanMode, Planner, Point, Polygon, PolygonKind, ProjectedRotation,
    RotationKind, WebMercator, path_length,
};

fn paddock() -> Vec<Point> {
    vec![
        Point::new(44.48010, -73.21210),
        Point::new(44.48010, -73.20950),
        Point::new(44.47900, -73.20950),
        Point::new(44.47900, -73.21080),
        Point::new(44.47820, -73.21080),
        Point::new(44.47820, -73.21210),
    ]
}

#[test]
fn paddock_is_concave_with_two_parts() {
    let field = Polygon::new(paddock()).unwrap();
    assert_eq!(field.kind(), PolygonKind::Concave);

    let parts = Planner::new().decompose(&field).unwrap();
    assert_eq!(parts.len(), 2);
    assert!(parts.iter().all(|p| p.is_convex()));
}

#[test]
fn sweep_rows_are_spaced_in_meters() {
    let field = Polygon::new(paddock()).unwrap();
    let spec = field.sweep_spec(15.0, Metric::Haversine).unwrap();

    // 0.0019 degrees of latitude is a little over 211 m
    assert_eq!(spec.lines, 14);
    let step_m = Point::new(44.48, -73.21)
        .distance_on_earth(Point::new(44.48 - spec.lat_step, -73.21));
    assert!(step_m >= 15.0 && step_m < 16.0, "step is {} m", step_m);
}

#[test]
fn stitched_route_stays_in_the_paddock() {
    let field = Polygon::new(paddock()).unwrap();

    for kind in DetourKind::all() {
        let route = Planner::new()
            .with_detour(kind.strategy())
            .plan(&paddock(), 15.0, 0.0, PlanMode::Stitched)
            .unwrap();

        assert!(route.len() >= 28, "{}: only {} waypoints", kind.name(), route.len());
        for leg in route.windows(2) {
            assert!(field.can_see(leg[0], leg[1]), "{}: leg {:?} leaves the field", kind.name(), leg);
        }
        for (i, a) in route.iter().enumerate() {
            assert!(
                route[i + 1..].iter().all(|b| !a.same_as(*b)),
                "{}: {:?} visited twice",
                kind.name(),
                a
            );
        }
    }
}

#[test]
fn shortest_detours_fly_less() {
    let greedy = Planner::new()
        .plan(&paddock(), 15.0, 0.0, PlanMode::Stitched)
        .unwrap();
    let shortest = Planner::new()
        .with_detour(DetourKind::Shortest.strategy())
        .plan(&paddock(), 15.0, 0.0, PlanMode::Stitched)
        .unwrap();

    let greedy_m = path_length(&greedy, Metric::Haversine);
    let shortest_m = path_length(&shortest, Metric::Haversine);
    assert!(shortest_m <= greedy_m + 1e-6, "{} > {}", shortest_m, greedy_m);
}

#[test]
fn simple_route_covers_each_part() {
    let field = Polygon::new(paddock()).unwrap();
    let route = Planner::new()
        .plan(&paddock(), 15.0, 0.0, PlanMode::Simple)
        .unwrap();

    assert!(!route.is_empty());
    assert_eq!(route.len() % 2, 0);
    assert!(route.iter().all(|p| field.contains(*p)));
}

#[test]
fn rotated_intersections_stay_on_the_fence() {
    let field = Polygon::new(paddock()).unwrap();
    let rows = Planner::new()
        .intersection_rows(&field, 15.0, 45.0)
        .unwrap();

    assert!(!rows.is_empty());
    for row in &rows {
        assert_eq!(row.points.len() % 2, 0);
        for p in &row.points {
            assert!(field.contains(*p), "{:?} is off the field", p);
        }
    }
}

/// A 207 m (east-west) by 122 m (north-south) rectangle at 44.48°N.
fn rectangle() -> Vec<Point> {
    let (lat, lng) = (44.48_f64, -73.21);
    let d_lat = 122.0 / 111_195.08;
    let d_lng = 207.0 / (111_195.08 * lat.to_radians().cos());
    vec![
        Point::new(lat, lng),
        Point::new(lat, lng + d_lng),
        Point::new(lat - d_lat, lng + d_lng),
        Point::new(lat - d_lat, lng),
    ]
}

/// Ground distance between the turn points of consecutive passes.
fn pass_spacing(route: &[Point]) -> Vec<f64> {
    (1..route.len() / 2)
        .map(|i| route[2 * i - 1].distance_on_earth(route[2 * i]))
        .collect()
}

#[test]
fn spacing_stays_in_meters_at_any_heading() {
    for angle in [0.0, 90.0, 270.0] {
        let route = Planner::new()
            .plan(&rectangle(), 15.0, angle, PlanMode::Simple)
            .unwrap();
        let gaps = pass_spacing(&route);
        assert!(!gaps.is_empty());
        for gap in gaps {
            assert!(gap > 14.9 && gap < 16.5, "{} deg: passes {} m apart", angle, gap);
        }
    }
}

#[test]
fn mercator_rotation_agrees_on_spacing() {
    let local = Planner::new()
        .plan(&rectangle(), 15.0, 90.0, PlanMode::Simple)
        .unwrap();
    let mercator = Planner::new()
        .with_rotation(RotationKind::Mercator)
        .plan(&rectangle(), 15.0, 90.0, PlanMode::Simple)
        .unwrap();
    let anchored = Planner::new()
        .with_rotator(ProjectedRotation::new(WebMercator::new(18.0, rectangle()[0])))
        .plan(&rectangle(), 15.0, 90.0, PlanMode::Simple)
        .unwrap();

    // 207 m across the heading at 15 m spacing: 13 intervals, 12 to 14 rows
    for route in [&local, &mercator, &anchored] {
        assert!(route.len() >= 24 && route.len() <= 28, "{} waypoints", route.len());
        for gap in pass_spacing(route) {
            assert!(gap > 14.9 && gap < 16.5, "passes {} m apart", gap);
        }
    }
}
