//! Plan command implementation.

use std::time::Instant;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use swath::{Metric, Planner, Polygon, path_length};

use super::common::{
    InputOptions, OutputFormat, generate_png, load_mission, parse_number, parse_origin,
    route_to_svg, write_output,
};
use super::mission::{LatLng, Overrides, print_example};

/// PNG output is the SVG canvas rendered at this scale.
const PNG_SCALE: f64 = 2.0;

/// Route statistics for JSON output.
///
/// `length` is in the mission's metric: meters for haversine, coordinate
/// units for planar.
#[derive(Serialize)]
struct JsonStats {
    waypoints: usize,
    length: f64,
    metric: &'static str,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parts: Option<usize>,
}

/// JSON output for one planned mission.
#[derive(Serialize)]
struct JsonPlan {
    mission: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    mode: &'static str,
    spacing: f64,
    angle: f64,
    generated_at: String,
    waypoints: Vec<LatLng>,
    stats: JsonStats,
}

/// Execute the plan command.
pub fn cmd_plan(args: &[String]) -> Result<()> {
    let mut input_path: Option<&str> = None;
    let mut output_path: Option<&str> = None;
    let mut format = OutputFormat::Json;
    let mut numbered = false;
    let mut overrides = Overrides::default();
    let mut input = InputOptions::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-s" | "--spacing" => {
                i += 1;
                if i < args.len() {
                    overrides.spacing = Some(parse_number("--spacing", &args[i])?);
                }
            }
            "-a" | "--angle" => {
                i += 1;
                if i < args.len() {
                    overrides.angle = Some(parse_number("--angle", &args[i])?);
                }
            }
            "-m" | "--mode" => {
                i += 1;
                if i < args.len() {
                    overrides.mode = Some(args[i].clone());
                }
            }
            "--metric" => {
                i += 1;
                if i < args.len() {
                    overrides.metric = Some(args[i].clone());
                }
            }
            "--rotation" => {
                i += 1;
                if i < args.len() {
                    overrides.rotation = Some(args[i].clone());
                }
            }
            "--order" => {
                i += 1;
                if i < args.len() {
                    overrides.order = Some(args[i].clone());
                }
            }
            "--detour" => {
                i += 1;
                if i < args.len() {
                    overrides.detour = Some(args[i].clone());
                }
            }
            "-f" | "--format" => {
                i += 1;
                if i < args.len() {
                    format = match OutputFormat::from_name(&args[i]) {
                        Some(f) => f,
                        None => bail!("Unknown format: {}. Use 'json', 'svg' or 'png'.", args[i]),
                    };
                }
            }
            "--json" => {
                format = OutputFormat::Json;
            }
            "-o" | "--output" => {
                i += 1;
                if i < args.len() {
                    output_path = Some(&args[i]);
                }
            }
            "--numbered" => {
                numbered = true;
            }
            "--zoom" => {
                i += 1;
                if i < args.len() {
                    input.zoom = parse_number("--zoom", &args[i])?;
                }
            }
            "--origin" => {
                i += 1;
                if i < args.len() {
                    input.origin = Some(parse_origin(&args[i])?);
                }
            }
            "--field" => {
                i += 1;
                if i < args.len() {
                    input.field = args[i]
                        .parse()
                        .with_context(|| format!("--field expects an index, got '{}'", args[i]))?;
                }
            }
            "--example" => {
                print_example();
                return Ok(());
            }
            "-h" | "--help" => {
                print_usage();
                return Ok(());
            }
            // Handled in main
            "-v" | "-vv" | "--verbose" => {}
            "-" => {
                if input_path.is_none() {
                    input_path = Some("-");
                }
            }
            path if !path.starts_with('-') => {
                if input_path.is_none() {
                    input_path = Some(path);
                }
            }
            unknown => {
                eprintln!("Unknown option: {}", unknown);
            }
        }
        i += 1;
    }

    let Some(input_path) = input_path else {
        print_usage();
        bail!("Mission or SVG file required (use '-' for SVG on stdin)");
    };

    let mission = load_mission(input_path, &input)?;
    let settings = mission.settings(&overrides)?;
    let planner = settings.planner();
    let boundary = mission.boundary_points();

    eprintln!(
        "Mission: {} ({} vertices, {} mode, {} m spacing, {}° heading)",
        mission.name,
        boundary.len(),
        settings.mode.name(),
        settings.spacing,
        settings.angle
    );

    let start = Instant::now();
    let route = planner
        .plan(&boundary, settings.spacing, settings.angle, settings.mode)
        .with_context(|| format!("Planning '{}' failed", mission.name))?;
    let elapsed = start.elapsed();

    let field = Polygon::new(boundary.clone())?;
    let parts = count_parts(&planner, &field);
    let length = path_length(&route, settings.metric);

    eprintln!(
        "Planned {} waypoints over {} part(s), {:.1} {} flown, in {:?}",
        route.len(),
        parts.map_or_else(|| "?".to_string(), |n| n.to_string()),
        length,
        length_unit(settings.metric),
        elapsed
    );

    match format {
        OutputFormat::Json => {
            let plan = JsonPlan {
                mission: mission.name.clone(),
                description: mission.description.clone(),
                mode: settings.mode.name(),
                spacing: settings.spacing,
                angle: settings.angle,
                generated_at: chrono::Utc::now().to_rfc3339(),
                waypoints: route.iter().map(|&p| p.into()).collect(),
                stats: JsonStats {
                    waypoints: route.len(),
                    length,
                    metric: settings.metric.name(),
                    kind: field.kind().name(),
                    parts,
                },
            };
            let json = serde_json::to_string_pretty(&plan).context("Failed to serialize JSON")?;
            write_output(output_path, &json)
        }
        OutputFormat::Svg => write_output(output_path, &route_to_svg(&boundary, &route, numbered)),
        OutputFormat::Png => match output_path {
            Some(png_path) if png_path != "-" => {
                generate_png(&route_to_svg(&boundary, &route, numbered), png_path, PNG_SCALE)
            }
            _ => bail!("PNG output needs a file: -o <route.png>"),
        },
    }
}

/// Convex parts the field splits into, for the stats only.
///
/// Stitched routes never decompose, so a decomposer failure here is not a
/// planning failure.
fn count_parts(planner: &Planner, field: &Polygon) -> Option<usize> {
    match planner.decompose(field) {
        Ok(parts) => Some(parts.len()),
        Err(e) => {
            log::warn!("could not count convex parts: {}", e);
            None
        }
    }
}

fn length_unit(metric: Metric) -> &'static str {
    match metric {
        Metric::Haversine => "m",
        Metric::Planar => "units",
    }
}

fn print_usage() {
    eprintln!("Usage: swath plan <mission.yaml|field.svg> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -s, --spacing <m>       Distance between sweep lines (default: mission or 20)");
    eprintln!("  -a, --angle <deg>       Sweep heading (default: mission or 0)");
    eprintln!("  -m, --mode <name>       simple, stitched, intersections (default: stitched)");
    eprintln!("  --metric <name>         haversine, planar (default: haversine)");
    eprintln!("  --rotation <name>       local, planar, mercator (default: follows the metric)");
    eprintln!("  --order <strategy>      Part ordering: document, nearest (default: nearest)");
    eprintln!("  --detour <strategy>     Row joins: greedy, shortest (default: greedy)");
    eprintln!("  -f, --format <fmt>      json, svg, png (default: json)");
    eprintln!("  -o, --output <file>     Output file (default: stdout)");
    eprintln!("  --numbered              Label waypoints in SVG/PNG output");
    eprintln!("  --example               Print an example mission file");
    eprintln!();
    eprintln!("SVG input:");
    eprintln!("  --origin <lat,lng>      Map position of pixel 0,0 (required)");
    eprintln!("  --zoom <z>              Web Mercator zoom the outline was drawn at (default: 18)");
    eprintln!("  --field <n>             Which outline to plan (default: 0)");
    eprintln!();
    eprintln!("Flags override values from the mission file.");
}
