//! Mission files: a field boundary plus default planning settings.
//!
//! Missions are YAML (or JSON) documents. Everything except the name and
//! the boundary has a default, so the smallest useful mission is:
//!
//! ```yaml
//! name: north paddock
//! boundary:
//!   - { lat: 44.4801, lng: -73.2121 }
//!   - { lat: 44.4801, lng: -73.2101 }
//!   - { lat: 44.4789, lng: -73.2101 }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use swath::{DetourKind, Metric, OrderingStrategy, PlanMode, Planner, Point, RotationKind};

/// A complete mission definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    /// Mission name, echoed in the output
    pub name: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,

    /// Field boundary, in order around the field
    pub boundary: Vec<LatLng>,

    /// Distance between sweep lines (meters with the haversine metric)
    #[serde(default = "default_spacing")]
    pub spacing: f64,

    /// Heading of the sweep lines in degrees
    #[serde(default)]
    pub angle: f64,

    /// Planning mode name (see `swath modes`)
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Distance metric name
    #[serde(default = "default_metric")]
    pub metric: String,

    /// How the field is turned to the sweep heading (default follows the metric)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<String>,

    /// Order in which decomposed parts are flown
    #[serde(default = "default_order")]
    pub order: String,

    /// Detour strategy used when stitching rows
    #[serde(default = "default_detour")]
    pub detour: String,
}

/// One boundary vertex as it appears in mission and output files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<Point> for LatLng {
    fn from(p: Point) -> Self {
        LatLng { lat: p.lat, lng: p.lng }
    }
}

impl From<LatLng> for Point {
    fn from(v: LatLng) -> Self {
        Point::new(v.lat, v.lng)
    }
}

fn default_spacing() -> f64 {
    20.0
}

fn default_mode() -> String {
    PlanMode::Stitched.name().to_string()
}

fn default_metric() -> String {
    Metric::Haversine.name().to_string()
}

fn default_order() -> String {
    OrderingStrategy::NearestNeighbor.name().to_string()
}

fn default_detour() -> String {
    DetourKind::Greedy.name().to_string()
}

/// Planning settings with every name resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanSettings {
    pub spacing: f64,
    pub angle: f64,
    pub mode: PlanMode,
    pub metric: Metric,
    pub rotation: RotationKind,
    pub order: OrderingStrategy,
    pub detour: DetourKind,
}

impl PlanSettings {
    /// A planner configured with these settings.
    pub fn planner(&self) -> Planner {
        Planner::new()
            .with_metric(self.metric)
            .with_rotation(self.rotation)
            .with_ordering(self.order)
            .with_detour(self.detour.strategy())
    }
}

/// Command-line values that take precedence over the mission file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub spacing: Option<f64>,
    pub angle: Option<f64>,
    pub mode: Option<String>,
    pub metric: Option<String>,
    pub rotation: Option<String>,
    pub order: Option<String>,
    pub detour: Option<String>,
}

impl Mission {
    /// Load a mission, choosing the parser by file extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read mission file {}", path.display()))?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
        .with_context(|| format!("Invalid mission file {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse mission YAML")
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse mission JSON")
    }

    /// A mission around a boundary imported from somewhere else (an SVG).
    pub fn from_boundary(name: impl Into<String>, boundary: &[Point]) -> Self {
        Mission {
            name: name.into(),
            description: None,
            boundary: boundary.iter().map(|&p| p.into()).collect(),
            spacing: default_spacing(),
            angle: 0.0,
            mode: default_mode(),
            metric: default_metric(),
            rotation: None,
            order: default_order(),
            detour: default_detour(),
        }
    }

    pub fn boundary_points(&self) -> Vec<Point> {
        self.boundary.iter().map(|&v| v.into()).collect()
    }

    /// Resolve the mission's settings, letting `overrides` win.
    pub fn settings(&self, overrides: &Overrides) -> Result<PlanSettings> {
        let mode = overrides.mode.as_deref().unwrap_or(&self.mode);
        let metric = overrides.metric.as_deref().unwrap_or(&self.metric);
        let order = overrides.order.as_deref().unwrap_or(&self.order);
        let detour = overrides.detour.as_deref().unwrap_or(&self.detour);

        let metric = Metric::from_name(metric)
            .ok_or_else(|| anyhow!("Unknown metric: {}. Use 'haversine' or 'planar'.", metric))?;
        let rotation = match overrides.rotation.as_deref().or(self.rotation.as_deref()) {
            Some(name) => RotationKind::from_name(name).ok_or_else(|| {
                anyhow!("Unknown rotation: {}. Use 'local', 'planar' or 'mercator'.", name)
            })?,
            None => RotationKind::for_metric(metric),
        };

        Ok(PlanSettings {
            spacing: overrides.spacing.unwrap_or(self.spacing),
            angle: overrides.angle.unwrap_or(self.angle),
            mode: PlanMode::from_name(mode).ok_or_else(|| {
                anyhow!("Unknown mode: {}. Use 'simple', 'stitched' or 'intersections'.", mode)
            })?,
            metric,
            rotation,
            order: OrderingStrategy::from_name(order).ok_or_else(|| {
                anyhow!("Unknown order strategy: {}. Use 'document' or 'nearest'.", order)
            })?,
            detour: DetourKind::from_name(detour).ok_or_else(|| {
                anyhow!("Unknown detour strategy: {}. Use 'greedy' or 'shortest'.", detour)
            })?,
        })
    }
}

/// Print an example mission to stdout.
pub fn print_example() {
    println!(
        r##"# Example swath mission
name: "North paddock"
description: "Spray run, east fence to the creek"

# Field outline in order (either direction works)
boundary:
  - {{ lat: 44.48010, lng: -73.21210 }}
  - {{ lat: 44.48010, lng: -73.20950 }}
  - {{ lat: 44.47900, lng: -73.20950 }}
  - {{ lat: 44.47900, lng: -73.21080 }}
  - {{ lat: 44.47820, lng: -73.21080 }}
  - {{ lat: 44.47820, lng: -73.21210 }}

spacing: 15        # meters between passes
angle: 0           # sweep heading in degrees
mode: stitched     # simple | stitched | intersections
metric: haversine  # haversine | planar
# rotation: local  # local | planar | mercator (default follows the metric)
order: nearest     # document | nearest (simple mode)
detour: greedy     # greedy | shortest (stitched mode)
"##
    );
}

// ============================================================================
// TESTS
// ============================================================================
