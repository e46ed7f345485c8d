//! Routing between two points inside a concave polygon.
//!
//! When the straight leg between two rows would leave the field, the
//! stitcher asks a [`DetourStrategy`] for a path through polygon vertices.
//!
//! - [`GreedyDetour`] hops to whichever visible vertex looks closest to the
//!   goal. Fast, but can wander.
//! - [`ShortestDetour`] builds the visibility graph and runs Dijkstra on it,
//!   so the detour is the shortest one through vertices.

use crate::error::{Error, Result};
use crate::geometry::{Metric, Point};
use crate::polygon::{Polygon, VertexSet};

/// Finds a path from `from` to `to` that stays inside `polygon`.
///
/// The returned path starts with `from` and ends with `to`.
pub trait DetourStrategy {
    fn find_detour(&self, polygon: &Polygon, from: Point, to: Point, metric: Metric)
    -> Result<Vec<Point>>;

    fn name(&self) -> &'static str;
}

/// Greedy vertex hopping, with a fresh visited set per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyDetour;

impl DetourStrategy for GreedyDetour {
    fn find_detour(
        &self,
        polygon: &Polygon,
        from: Point,
        to: Point,
        metric: Metric,
    ) -> Result<Vec<Point>> {
        let mut visited = VertexSet::new();
        polygon.find_path(from, to, &mut visited, metric)
    }

    fn name(&self) -> &'static str {
        "greedy"
    }
}

/// Dijkstra over the visibility graph of `{from, to} ∪ vertices`.
///
/// Edges are tested lazily as nodes are settled, which keeps this at
/// O(V²) visibility checks with no heap or graph library.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortestDetour;

impl DetourStrategy for ShortestDetour {
    fn find_detour(
        &self,
        polygon: &Polygon,
        from: Point,
        to: Point,
        metric: Metric,
    ) -> Result<Vec<Point>> {
        if polygon.can_see(from, to) {
            return Ok(vec![from, to]);
        }

        let mut nodes = Vec::with_capacity(polygon.vertex_count() + 2);
        nodes.push(from);
        nodes.push(to);
        nodes.extend_from_slice(polygon.vertices());
        let n = nodes.len();

        let mut dist = vec![f64::INFINITY; n];
        let mut prev: Vec<Option<usize>> = vec![None; n];
        let mut settled = vec![false; n];
        dist[0] = 0.0;

        loop {
            let current = (0..n)
                .filter(|&i| !settled[i] && dist[i].is_finite())
                .min_by(|&a, &b| dist[a].total_cmp(&dist[b]));

            let Some(u) = current else { break };
            if u == 1 {
                break;
            }
            settled[u] = true;

            for v in 0..n {
                if settled[v] || !polygon.can_see(nodes[u], nodes[v]) {
                    continue;
                }
                let alt = dist[u] + metric.distance(nodes[u], nodes[v]);
                if alt < dist[v] {
                    dist[v] = alt;
                    prev[v] = Some(u);
                }
            }
        }

        if !dist[1].is_finite() {
            return Err(Error::PathfindingExhausted { from, to });
        }

        let mut path = vec![to];
        let mut at = 1;
        while let Some(p) = prev[at] {
            path.push(nodes[p]);
            at = p;
        }
        path.reverse();
        Ok(path)
    }

    fn name(&self) -> &'static str {
        "shortest"
    }
}

/// Detour strategies by name, for configuration and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetourKind {
    #[default]
    Greedy,
    Shortest,
}

impl DetourKind {
    pub fn name(&self) -> &'static str {
        match self {
            DetourKind::Greedy => "greedy",
            DetourKind::Shortest => "shortest",
        }
    }

    pub fn from_name(name: &str) -> Option<DetourKind> {
        match name.to_lowercase().as_str() {
            "greedy" => Some(DetourKind::Greedy),
            "shortest" | "dijkstra" | "visibility" => Some(DetourKind::Shortest),
            _ => None,
        }
    }

    pub fn all() -> &'static [DetourKind] {
        &[DetourKind::Greedy, DetourKind::Shortest]
    }

    /// Boxed strategy for this kind.
    pub fn strategy(&self) -> Box<dyn DetourStrategy> {
        match self {
            DetourKind::Greedy => Box::new(GreedyDetour),
            DetourKind::Shortest => Box::new(ShortestDetour),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
