//! Ordering of convex parts and route length.
//!
//! After a concave field is split into convex parts, each part is flown as
//! its own lawnmower pattern. The order the parts are flown in decides how
//! long the transit legs between them are.
//!
//! ## Algorithms
//!
//! - **Document**: the order the decomposer produced
//! - **Nearest Neighbor**: start at the first part, then greedily fly to the
//!   part whose centroid is closest. O(n²), fine for the handful of parts a
//!   field produces

use crate::geometry::{Metric, Point};
use crate::polygon::Polygon;

/// Vertex average of a polygon.
pub fn part_centroid(polygon: &Polygon) -> Point {
    let vertices = polygon.vertices();
    let n = vertices.len() as f64;
    let lat: f64 = vertices.iter().map(|p| p.lat).sum();
    let lng: f64 = vertices.iter().map(|p| p.lng).sum();
    Point::new(lat / n, lng / n)
}

/// Order parts with the nearest-neighbor heuristic, starting from part 0.
///
/// Returns indices into `parts`.
pub fn order_nearest_neighbor(parts: &[Polygon], metric: Metric) -> Vec<usize> {
    let n = parts.len();
    if n <= 1 {
        return (0..n).collect();
    }

    let centroids: Vec<Point> = parts.iter().map(part_centroid).collect();
    let mut remaining: Vec<usize> = (1..n).collect();
    let mut order = Vec::with_capacity(n);
    let mut current = 0;
    order.push(current);

    while !remaining.is_empty() {
        let here = centroids[current];
        let (slot, _) = remaining
            .iter()
            .enumerate()
            .map(|(slot, &i)| (slot, metric.distance(here, centroids[i])))
            .fold((0, f64::INFINITY), |best, cand| if cand.1 < best.1 { cand } else { best });

        current = remaining.remove(slot);
        order.push(current);
    }

    order
}

/// Centroid-to-centroid travel for a given part order.
pub fn calculate_travel_distance(parts: &[Polygon], order: &[usize], metric: Metric) -> f64 {
    let centroids: Vec<Point> = order.iter().map(|&i| part_centroid(&parts[i])).collect();
    path_length(&centroids, metric)
}

/// Total length of a polyline.
pub fn path_length(points: &[Point], metric: Metric) -> f64 {
    points
        .windows(2)
        .map(|w| metric.distance(w[0], w[1]))
        .sum()
}

/// Ordering strategy for convex parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderingStrategy {
    /// Keep decomposition order
    #[default]
    Document,
    /// Nearest neighbor greedy optimization
    NearestNeighbor,
}

impl OrderingStrategy {
    /// Get strategy name as string.
    pub fn name(&self) -> &'static str {
        match self {
            OrderingStrategy::Document => "document",
            OrderingStrategy::NearestNeighbor => "nearest",
        }
    }

    /// Parse strategy from string.
    pub fn from_name(name: &str) -> Option<OrderingStrategy> {
        match name.to_lowercase().as_str() {
            "document" | "doc" | "original" => Some(OrderingStrategy::Document),
            "nearest" | "nn" | "nearest-neighbor" => Some(OrderingStrategy::NearestNeighbor),
            _ => None,
        }
    }

    /// All available strategies.
    pub fn all() -> &'static [OrderingStrategy] {
        &[OrderingStrategy::Document, OrderingStrategy::NearestNeighbor]
    }
}

/// Apply ordering strategy to get part indices.
pub fn order_parts(parts: &[Polygon], strategy: OrderingStrategy, metric: Metric) -> Vec<usize> {
    match strategy {
        OrderingStrategy::Document => (0..parts.len()).collect(),
        OrderingStrategy::NearestNeighbor => order_nearest_neighbor(parts, metric),
    }
}
