//! Map projection and route rendering.
//!
//! A [`Projection`] turns lat/lng into screen pixels and back. A
//! [`Renderer`] draws a boundary, route legs and waypoint markers.
//! [`SvgRenderer`] is the built-in renderer: it builds an SVG document with
//! plain `format!` calls, the same way the line and chain writers do.

use crate::geometry::Point;
use std::f64::consts::PI;
use std::fmt::Write;

/// Tile edge length of the Web Mercator pyramid at zoom 0.
pub const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the Web Mercator square.
const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

/// A screen coordinate (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pixel {
    pub x: f64,
    pub y: f64,
}

impl Pixel {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Conversion between geographic points and screen pixels.
pub trait Projection {
    fn project(&self, point: Point) -> Pixel;
    fn unproject(&self, pixel: Pixel) -> Point;
}

/// Spherical Web Mercator at a fixed zoom, with a viewport offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WebMercator {
    zoom: f64,
    /// World pixel that maps to screen (0, 0)
    offset: Pixel,
}

impl WebMercator {
    /// Projection whose screen origin sits on `origin`.
    pub fn new(zoom: f64, origin: Point) -> Self {
        let offset = world_pixel(origin, world_size(zoom));
        Self { zoom, offset }
    }

    /// Pick zoom and origin so `points` fill a `width` x `height` viewport
    /// with `padding` pixels on every side.
    pub fn fit(points: &[Point], width: f64, height: f64, padding: f64) -> Self {
        let base = Self::new(0.0, Point::new(0.0, 0.0));
        let Some((min, max)) = pixel_bounds(&base, points) else {
            return Self::new(0.0, Point::new(MAX_MERCATOR_LAT, -180.0));
        };

        let span_x = (max.x - min.x).max(f64::EPSILON);
        let span_y = (max.y - min.y).max(f64::EPSILON);
        let scale = ((width - 2.0 * padding) / span_x).min((height - 2.0 * padding) / span_y);
        let zoom = scale.max(f64::MIN_POSITIVE).log2().clamp(0.0, 24.0);

        let size = world_size(zoom);
        let factor = size / TILE_SIZE;
        let world_min = Pixel::new(
            (min.x + base.offset.x) * factor,
            (min.y + base.offset.y) * factor,
        );

        Self {
            zoom,
            offset: Pixel::new(world_min.x - padding, world_min.y - padding),
        }
    }
}

impl Projection for WebMercator {
    fn project(&self, point: Point) -> Pixel {
        let world = world_pixel(point, world_size(self.zoom));
        Pixel::new(world.x - self.offset.x, world.y - self.offset.y)
    }

    fn unproject(&self, pixel: Pixel) -> Point {
        let size = world_size(self.zoom);
        let wx = pixel.x + self.offset.x;
        let wy = pixel.y + self.offset.y;

        let lng = wx / size * 360.0 - 180.0;
        let n = PI - 2.0 * PI * wy / size;
        let lat = n.sinh().atan().to_degrees();
        Point::new(lat, lng)
    }
}

fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * zoom.exp2()
}

fn world_pixel(point: Point, size: f64) -> Pixel {
    let lat = point.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    let sin = lat.to_radians().sin();
    let x = (point.lng + 180.0) / 360.0 * size;
    let y = (0.5 - ((1.0 + sin) / (1.0 - sin)).ln() / (4.0 * PI)) * size;
    Pixel::new(x, y)
}

fn pixel_bounds(projection: &dyn Projection, points: &[Point]) -> Option<(Pixel, Pixel)> {
    let mut iter = points.iter().map(|p| projection.project(*p));
    let first = iter.next()?;
    Some(iter.fold((first, first), |(min, max), p| {
        (
            Pixel::new(min.x.min(p.x), min.y.min(p.y)),
            Pixel::new(max.x.max(p.x), max.y.max(p.y)),
        )
    }))
}

// ============================================================================
// RENDERING
// ============================================================================

/// Something that can draw a planned route.
pub trait Renderer {
    fn draw_boundary(&mut self, vertices: &[Point]);
    fn draw_segment(&mut self, from: Point, to: Point);
    fn draw_waypoint(&mut self, point: Point, label: Option<&str>);
}

/// Draw a route: one segment per leg, plus numbered markers if asked.
pub fn render_route(renderer: &mut dyn Renderer, route: &[Point], numbered: bool) {
    for leg in route.windows(2) {
        renderer.draw_segment(leg[0], leg[1]);
    }

    for (i, point) in route.iter().enumerate() {
        if numbered {
            renderer.draw_waypoint(*point, Some(&(i + 1).to_string()));
        } else {
            renderer.draw_waypoint(*point, None);
        }
    }
}

/// Builds an SVG document in screen space.
///
/// ## Rust Lesson #9: Generics vs Trait Objects
///
/// `SvgRenderer<P>` is generic over its projection, so every `project`
/// call is statically dispatched. The renderer itself is usually handed
/// around as `&mut dyn Renderer`, where one vtable call per shape is fine.
#[derive(Debug, Clone)]
pub struct SvgRenderer<P: Projection> {
    projection: P,
    width: f64,
    height: f64,
    boundary: String,
    legs: String,
    markers: String,
}

impl<P: Projection> SvgRenderer<P> {
    pub fn new(projection: P, width: f64, height: f64) -> Self {
        Self {
            projection,
            width,
            height,
            boundary: String::new(),
            legs: String::new(),
            markers: String::new(),
        }
    }

    /// Finish the document.
    pub fn finish(self) -> String {
        let mut svg = String::new();
        svg.push_str(&format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.2} {h:.2}">
<rect width="100%" height="100%" fill="white"/>
"#,
            w = self.width,
            h = self.height
        ));

        svg.push_str("<g stroke=\"#2b6cb0\" stroke-width=\"1.5\" fill=\"#ebf4ff\">\n");
        svg.push_str(&self.boundary);
        svg.push_str("</g>\n<g stroke=\"black\" stroke-width=\"1\" fill=\"none\">\n");
        svg.push_str(&self.legs);
        svg.push_str("</g>\n<g fill=\"#c53030\" font-family=\"sans-serif\" font-size=\"9\">\n");
        svg.push_str(&self.markers);
        svg.push_str("</g>\n</svg>\n");
        svg
    }
}

impl<P: Projection> Renderer for SvgRenderer<P> {
    fn draw_boundary(&mut self, vertices: &[Point]) {
        if vertices.len() < 3 {
            return;
        }
        let points: Vec<String> = vertices
            .iter()
            .map(|v| {
                let p = self.projection.project(*v);
                format!("{:.2},{:.2}", p.x, p.y)
            })
            .collect();
        let _ = writeln!(self.boundary, "  <polygon points=\"{}\"/>", points.join(" "));
    }

    fn draw_segment(&mut self, from: Point, to: Point) {
        let a = self.projection.project(from);
        let b = self.projection.project(to);
        let _ = writeln!(
            self.legs,
            "  <line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\"/>",
            a.x, a.y, b.x, b.y
        );
    }

    fn draw_waypoint(&mut self, point: Point, label: Option<&str>) {
        let p = self.projection.project(point);
        let _ = writeln!(self.markers, "  <circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"2.5\"/>", p.x, p.y);
        if let Some(text) = label {
            let _ = writeln!(
                self.markers,
                "  <text x=\"{:.2}\" y=\"{:.2}\">{}</text>",
                p.x + 4.0,
                p.y - 4.0,
                text
            );
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mercator_round_trip() {
        let projection = WebMercator::new(16.0, Point::new(30.3, 120.1));
        let p = Point::new(30.2741, 120.1551);
        let back = projection.unproject(projection.project(p));
        assert!(back.approx_eq(p, 1e-9), "got {:?}", back);
    }

    #[test]
    fn origin_projects_to_zero() {
        let origin = Point::new(45.0, -73.5);
        let px = WebMercator::new(12.0, origin).project(origin);
        assert!(px.x.abs() < 1e-6 && px.y.abs() < 1e-6, "got {:?}", px);
    }

    #[test]
    fn north_is_up() {
        let projection = WebMercator::new(10.0, Point::new(10.0, 0.0));
        let south = projection.project(Point::new(1.0, 1.0));
        let north = projection.project(Point::new(2.0, 1.0));
        assert!(north.y < south.y);
    }

    #[test]
    fn fit_keeps_points_in_viewport() {
        let points = [
            Point::new(30.0, 120.0),
            Point::new(30.01, 120.0),
            Point::new(30.01, 120.02),
            Point::new(30.0, 120.02),
        ];
        let projection = WebMercator::fit(&points, 800.0, 600.0, 20.0);
        for p in points {
            let px = projection.project(p);
            assert!(px.x >= 19.0 && px.x <= 781.0, "x out of view: {:?}", px);
            assert!(px.y >= 19.0 && px.y <= 581.0, "y out of view: {:?}", px);
        }
    }

    #[derive(Default)]
    struct Recorder {
        segments: usize,
        labels: Vec<Option<String>>,
    }

    impl Renderer for Recorder {
        fn draw_boundary(&mut self, _vertices: &[Point]) {}
        fn draw_segment(&mut self, _from: Point, _to: Point) {
            self.segments += 1;
        }
        fn draw_waypoint(&mut self, _point: Point, label: Option<&str>) {
            self.labels.push(label.map(str::to_string));
        }
    }

    #[test]
    fn route_is_drawn_leg_by_leg() {
        let route = [Point::new(0.0, 0.0), Point::new(0.0, 1.0), Point::new(1.0, 1.0)];
        let mut recorder = Recorder::default();
        render_route(&mut recorder, &route, true);
        assert_eq!(recorder.segments, 2);
        assert_eq!(recorder.labels[2].as_deref(), Some("3"));

        let mut plain = Recorder::default();
        render_route(&mut plain, &route, false);
        assert!(plain.labels.iter().all(Option::is_none));
    }

    #[test]
    fn svg_contains_every_layer() {
        let boundary = [Point::new(0.0, 0.0), Point::new(0.0, 0.01), Point::new(0.01, 0.0)];
        let mut svg = SvgRenderer::new(WebMercator::fit(&boundary, 200.0, 200.0, 10.0), 200.0, 200.0);
        svg.draw_boundary(&boundary);
        render_route(&mut svg, &boundary, true);
        let doc = svg.finish();
        assert!(doc.contains("<polygon"));
        assert_eq!(doc.matches("<line").count(), 2);
        assert_eq!(doc.matches("<circle").count(), 3);
        assert!(doc.contains(">1</text>"));
    }
}
