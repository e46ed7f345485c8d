//! SVG import - read field boundaries drawn on a map.
//!
//! Uses usvg for complete SVG resolution (CSS, shapes to paths, etc.)
//! then walks the tree and turns every closed path into a boundary.
//! usvg keeps path data in the path's own frame, so each vertex is mapped
//! through the path's absolute transform into document pixels, then
//! unprojected through the caller's [`Projection`] to get lat/lng.
//!
//! ## Curve Flattening
//!
//! Field outlines traced in a drawing tool often contain Bézier curves.
//! These are flattened into line segments with lyon_geom before
//! unprojecting.

use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::render::{Pixel, Projection};
use lyon_geom::{CubicBezierSegment, QuadraticBezierSegment, point};

/// Tolerance for curve flattening, in SVG pixels.
const CURVE_TOLERANCE: f32 = 0.1;

/// Extract every boundary from an SVG document.
///
/// ## Rust Lesson #21: The ? Operator
///
/// `expression?` is sugar for:
/// ```text
/// match expression {
///     Ok(v) => v,
///     Err(e) => return Err(e.into()),
/// }
/// ```
pub fn extract_boundaries_from_svg(
    svg_content: &str,
    projection: &dyn Projection,
) -> Result<Vec<Vec<Point>>> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg_content, &options)
        .map_err(|e| Error::SvgParse(e.to_string()))?;

    let mut outlines = Vec::new();
    extract_from_group(tree.root(), &mut outlines);

    if outlines.is_empty() {
        return Err(Error::NoBoundaries);
    }

    log::debug!("found {} boundaries in SVG", outlines.len());
    Ok(outlines
        .into_iter()
        .map(|outline| outline.into_iter().map(|px| projection.unproject(px)).collect())
        .collect())
}

fn extract_from_group(group: &usvg::Group, outlines: &mut Vec<Vec<Pixel>>) {
    for child in group.children() {
        match child {
            usvg::Node::Group(group) => extract_from_group(group, outlines),
            usvg::Node::Path(path) => {
                if let Some(outline) = path_to_outline(path) {
                    outlines.push(outline);
                }
            }
            // Text and images carry no boundaries
            _ => {}
        }
    }
}

/// First subpath of a usvg path as a pixel ring.
fn path_to_outline(path: &usvg::Path) -> Option<Vec<Pixel>> {
    use usvg::tiny_skia_path::PathSegment;

    let mut pixels = Vec::new();
    let mut last: Option<(f32, f32)> = None;

    for segment in path.data().segments() {
        match segment {
            PathSegment::MoveTo(p) => {
                // Holes and islands are separate subpaths; only the outer ring is kept
                if !pixels.is_empty() {
                    break;
                }
                pixels.push(Pixel::new(p.x as f64, p.y as f64));
                last = Some((p.x, p.y));
            }
            PathSegment::LineTo(p) => {
                pixels.push(Pixel::new(p.x as f64, p.y as f64));
                last = Some((p.x, p.y));
            }
            PathSegment::QuadTo(ctrl, p) => {
                if let Some((lx, ly)) = last {
                    let curve = QuadraticBezierSegment {
                        from: point(lx, ly),
                        ctrl: point(ctrl.x, ctrl.y),
                        to: point(p.x, p.y),
                    };
                    curve.for_each_flattened(CURVE_TOLERANCE, &mut |line| {
                        pixels.push(Pixel::new(line.to.x as f64, line.to.y as f64));
                    });
                } else {
                    pixels.push(Pixel::new(p.x as f64, p.y as f64));
                }
                last = Some((p.x, p.y));
            }
            PathSegment::CubicTo(ctrl1, ctrl2, p) => {
                if let Some((lx, ly)) = last {
                    let curve = CubicBezierSegment {
                        from: point(lx, ly),
                        ctrl1: point(ctrl1.x, ctrl1.y),
                        ctrl2: point(ctrl2.x, ctrl2.y),
                        to: point(p.x, p.y),
                    };
                    curve.for_each_flattened(CURVE_TOLERANCE, &mut |line| {
                        pixels.push(Pixel::new(line.to.x as f64, line.to.y as f64));
                    });
                } else {
                    pixels.push(Pixel::new(p.x as f64, p.y as f64));
                }
                last = Some((p.x, p.y));
            }
            PathSegment::Close => {}
        }
    }

    pixels.dedup_by(|a, b| (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6);

    // An explicitly closed ring repeats its first vertex
    if pixels.len() > 1 {
        let (first, last) = (pixels[0], pixels[pixels.len() - 1]);
        if (first.x - last.x).abs() < 1e-6 && (first.y - last.y).abs() < 1e-6 {
            pixels.pop();
        }
    }

    if pixels.len() < 3 {
        return None;
    }

    let transform = path.abs_transform();
    if !transform.is_identity() {
        for px in &mut pixels {
            *px = apply_transform(&transform, *px);
        }
    }

    Some(pixels)
}

/// Map a local path point into document space.
fn apply_transform(t: &usvg::Transform, px: Pixel) -> Pixel {
    let (sx, kx, ky, sy) = (t.sx as f64, t.kx as f64, t.ky as f64, t.sy as f64);
    Pixel::new(
        sx * px.x + kx * px.y + t.tx as f64,
        ky * px.x + sy * px.y + t.ty as f64,
    )
}

// ============================================================================
// TESTS
// ============================================================================
