//! Convex decomposition of a simple polygon.
//!
//! ## Algorithm
//!
//! [`ReflexSplitDecomposer`] repeatedly picks a reflex vertex and extends
//! its incoming edge into the polygon until the extension meets the
//! boundary. The polygon is cut along that chord. The cut removes the
//! reflex angle at that vertex and never creates a new one, so the work
//! list drains after at most one cut per reflex vertex.
//!
//! On rectilinear fields (the common case for farmland) this produces
//! rectangles. The split order follows the ring, so results are
//! deterministic.

use crate::error::{Error, Result};
use crate::geometry::{Orientation, Point, orientation, signed_area};

/// Ray parameters closer to zero than this do not count as a forward hit.
const RAY_EPSILON: f64 = 1e-9;

/// Splits a simple polygon into convex parts.
///
/// Any closure `Fn(&[Point]) -> Result<Vec<Vec<Point>>>` also works, so an
/// external decomposition service can be plugged straight into a
/// [`Planner`](crate::Planner).
pub trait Decompose {
    fn decompose(&self, vertices: &[Point]) -> Result<Vec<Vec<Point>>>;
}

impl<F> Decompose for F
where
    F: Fn(&[Point]) -> Result<Vec<Vec<Point>>>,
{
    fn decompose(&self, vertices: &[Point]) -> Result<Vec<Vec<Point>>> {
        self(vertices)
    }
}

/// Cuts at reflex vertices along their incoming edge direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReflexSplitDecomposer;

impl Decompose for ReflexSplitDecomposer {
    fn decompose(&self, vertices: &[Point]) -> Result<Vec<Vec<Point>>> {
        if vertices.len() < 3 {
            return Err(Error::TooFewVertices {
                count: vertices.len(),
            });
        }

        let mut ring = vertices.to_vec();
        if signed_area(&ring) < 0.0 {
            ring.reverse();
        }

        // Every cut removes one reflex vertex, the extra slack covers
        // numerically stubborn input.
        let budget = 2 * ring.len() + 4;
        let mut pending = vec![ring];
        let mut parts = Vec::new();
        let mut cuts = 0;

        while let Some(ring) = pending.pop() {
            let Some(reflex) = find_reflex(&ring) else {
                parts.push(drop_colinear(ring));
                continue;
            };

            cuts += 1;
            if cuts > budget {
                return Err(Error::Decomposition(format!(
                    "no convex split after {} cuts",
                    budget
                )));
            }

            let (first, second) = split_at(&ring, reflex)?;
            pending.push(second);
            pending.push(first);
        }

        log::debug!("decomposed into {} convex parts with {} cuts", parts.len(), cuts);
        Ok(parts)
    }
}

/// First vertex (in ring order) where a counter-clockwise ring turns right.
fn find_reflex(ring: &[Point]) -> Option<usize> {
    let n = ring.len();
    (0..n).find(|&i| {
        let prev = ring[(i + n - 1) % n];
        let next = ring[(i + 1) % n];
        orientation(prev, ring[i], next) == Orientation::Clockwise
    })
}

/// Where the extended edge into `ring[i]` first meets the boundary.
enum Hit {
    Vertex(usize),
    /// Interior point of the edge starting at the given vertex
    Edge(usize, Point),
}

fn cast_from(ring: &[Point], i: usize) -> Option<Hit> {
    let n = ring.len();
    let origin = ring[i];
    let prev = ring[(i + n - 1) % n];
    let (dx, dy) = (origin.lng - prev.lng, origin.lat - prev.lat);

    let mut best: Option<(f64, usize, f64)> = None;
    for j in 0..n {
        let k = (j + 1) % n;
        if j == i || k == i {
            continue;
        }

        let (a, b) = (ring[j], ring[k]);
        let (ex, ey) = (b.lng - a.lng, b.lat - a.lat);
        let denom = dx * ey - dy * ex;
        let scale = dx.hypot(dy) * ex.hypot(ey);
        if scale == 0.0 || (denom / scale).abs() < RAY_EPSILON {
            continue;
        }

        // origin + t * d = a + s * e
        let (wx, wy) = (a.lng - origin.lng, a.lat - origin.lat);
        let t = (wx * ey - wy * ex) / denom;
        let s = (wx * dy - wy * dx) / denom;
        if t <= RAY_EPSILON || !(-RAY_EPSILON..=1.0 + RAY_EPSILON).contains(&s) {
            continue;
        }

        if best.is_none_or(|(best_t, _, _)| t < best_t) {
            best = Some((t, j, s));
        }
    }

    let (_, j, s) = best?;
    let k = (j + 1) % n;
    let hit = Point::new(
        ring[j].lat + s * (ring[k].lat - ring[j].lat),
        ring[j].lng + s * (ring[k].lng - ring[j].lng),
    );

    Some(if hit.same_as(ring[j]) {
        Hit::Vertex(j)
    } else if hit.same_as(ring[k]) {
        Hit::Vertex(k)
    } else {
        Hit::Edge(j, hit)
    })
}

/// Cut `ring` along the chord from reflex vertex `i`.
fn split_at(ring: &[Point], i: usize) -> Result<(Vec<Point>, Vec<Point>)> {
    let n = ring.len();
    let hit = cast_from(ring, i).ok_or_else(|| {
        Error::Decomposition(format!(
            "extension from reflex vertex ({:.7}, {:.7}) never meets the boundary",
            ring[i].lat, ring[i].lng
        ))
    })?;

    let (first, second) = match hit {
        Hit::Vertex(m) => (walk(ring, i, m), walk(ring, m, i)),
        Hit::Edge(j, p) => {
            let mut first = walk(ring, i, j);
            first.push(p);
            let mut second = vec![p];
            second.extend(walk(ring, (j + 1) % n, i));
            (first, second)
        }
    };

    if first.len() < 3 || second.len() < 3 {
        return Err(Error::Decomposition(
            "cut produced a degenerate part".to_string(),
        ));
    }
    Ok((first, second))
}

/// Vertices from `from` to `to` inclusive, walking forward around the ring.
fn walk(ring: &[Point], from: usize, to: usize) -> Vec<Point> {
    let n = ring.len();
    let mut out = Vec::new();
    let mut i = from;
    loop {
        out.push(ring[i]);
        if i == to {
            break;
        }
        i = (i + 1) % n;
    }
    out
}

/// Remove vertices that sit on a straight run.
fn drop_colinear(mut ring: Vec<Point>) -> Vec<Point> {
    let mut i = 0;
    while ring.len() > 3 && i < ring.len() {
        let n = ring.len();
        let prev = ring[(i + n - 1) % n];
        let next = ring[(i + 1) % n];
        if orientation(prev, ring[i], next) == Orientation::Colinear {
            ring.remove(i);
        } else {
            i += 1;
        }
    }
    ring
}

// ============================================================================
// TESTS
// ============================================================================
