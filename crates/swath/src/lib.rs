//! # swath
//!
//! Boustrophedon ("lawnmower") coverage planning over geographic polygons.
//!
//! Give it a field boundary in lat/lng, a line spacing and a heading, and
//! it returns the ordered waypoints a survey drone or tractor follows to
//! cover the field in back-and-forth passes.
//!
//! ```
//! use swath::{Metric, PlanMode, Planner, Point};
//!
//! let field = [
//!     Point::new(0.0, 0.0),
//!     Point::new(0.0, 10.0),
//!     Point::new(10.0, 10.0),
//!     Point::new(10.0, 0.0),
//! ];
//! let route = Planner::new()
//!     .with_metric(Metric::Planar)
//!     .plan(&field, 2.0, 0.0, PlanMode::Stitched)
//!     .unwrap();
//! assert_eq!(route.len(), 10);
//! ```
//!
//! ## Rust Lesson #7: Modules
//!
//! Every module is declared explicitly with `pub mod`, and the types most
//! callers need are re-exported here so `use swath::Planner` works without
//! knowing the file layout.

pub mod decompose;
pub mod detour;
pub mod error;
pub mod geometry;
pub mod order;
pub mod planner;
pub mod polygon;
pub mod render;
pub mod rotate;
pub mod stitch;
pub mod svg;
pub mod sweep;

// Re-export common types at crate root for convenience.
pub use decompose::{Decompose, ReflexSplitDecomposer};
pub use detour::{DetourKind, DetourStrategy, GreedyDetour, ShortestDetour};
pub use error::{Error, Result, Stage};
pub use geometry::{Metric, Orientation, Point, Vector, orientation};
pub use order::{OrderingStrategy, order_parts, path_length};
pub use planner::{PlanMode, Planner, plan_coverage};
pub use polygon::{OuterBound, Polygon, PolygonKind, SweepSpec, VertexSet};
pub use render::{Pixel, Projection, Renderer, SvgRenderer, WebMercator, render_route};
pub use rotate::{LocalRotation, PlanarRotation, ProjectedRotation, Rotate, RotationKind};
pub use stitch::{StitchState, stitch_rows};
pub use svg::extract_boundaries_from_svg;
pub use sweep::{SweepRow, sweep_rows};
