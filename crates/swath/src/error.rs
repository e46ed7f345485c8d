//! Error type for planning.
//!
//! Degenerate geometry (parallel segments, horizontal edges, rows that only
//! touch the boundary) is NOT an error - it is skipped where it happens.
//! Everything here is either malformed input or a planning run that cannot
//! finish.

use crate::geometry::Point;

/// The pipeline stage an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Building points, vectors and polygons from caller input
    Construction,
    /// Splitting a concave boundary into convex parts
    Decomposition,
    /// Turning polygons into sweep rows
    SweepGeneration,
    /// Joining rows into one route
    Stitching,
    /// Reading boundaries from external formats
    Import,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Construction => "construction",
            Stage::Decomposition => "decomposition",
            Stage::SweepGeneration => "sweep generation",
            Stage::Stitching => "stitching",
            Stage::Import => "import",
        }
    }
}

/// Unrecoverable planning errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("polygon needs at least 3 vertices, got {count}")]
    TooFewVertices { count: usize },

    #[error("vertex {index} has a non-finite coordinate")]
    InvalidCoordinate { index: usize },

    #[error("line spacing must be a positive finite number, got {0}")]
    InvalidSpacing(f64),

    #[error("vector needs at least one coordinate")]
    EmptyVector,

    #[error("vector dimensions differ: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("cross product is only defined for 2-D and 3-D vectors, got {0}-D")]
    UnsupportedDimension(usize),

    #[error("convex decomposition failed: {0}")]
    Decomposition(String),

    #[error(
        "no visible unvisited vertex left while routing from ({:.7}, {:.7}) to ({:.7}, {:.7})",
        from.lat, from.lng, to.lat, to.lng
    )]
    PathfindingExhausted { from: Point, to: Point },

    #[error("SVG parse error: {0}")]
    SvgParse(String),

    #[error("no boundaries found in SVG")]
    NoBoundaries,
}

impl Error {
    /// Which stage of the pipeline failed.
    pub fn stage(&self) -> Stage {
        match self {
            Error::TooFewVertices { .. }
            | Error::InvalidCoordinate { .. }
            | Error::EmptyVector
            | Error::DimensionMismatch { .. }
            | Error::UnsupportedDimension(_) => Stage::Construction,
            Error::InvalidSpacing(_) => Stage::SweepGeneration,
            Error::Decomposition(_) => Stage::Decomposition,
            Error::PathfindingExhausted { .. } => Stage::Stitching,
            Error::SvgParse(_) | Error::NoBoundaries => Stage::Import,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
