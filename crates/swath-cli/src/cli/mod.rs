//! CLI command implementations.
//!
//! This module contains the implementations for the CLI subcommands:
//! - `plan` - Plan a coverage route for a mission file or SVG outline
//! - `classify` - Report convexity, bounds and convex parts of a field
//! - `benchmark` - Time every planning mode on one field
//! - `modes` - List planning modes

pub mod benchmark;
pub mod classify;
pub mod common;
pub mod logging;
pub mod mission;
pub mod plan;

pub use benchmark::cmd_benchmark;
pub use classify::cmd_classify;
pub use logging::{init_logging, verbosity};
pub use plan::cmd_plan;
