//! Classify command: what kind of field is this?

use anyhow::{Context, Result, bail};
use swath::Polygon;

use super::common::{InputOptions, load_mission, parse_number, parse_origin};
use super::mission::Overrides;

/// Execute the classify command.
pub fn cmd_classify(args: &[String]) -> Result<()> {
    let mut input_path: Option<&str> = None;
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
            "-h" | "--help" => {
                print_usage();
                return Ok(());
            }
            "-v" | "-vv" | "--verbose" => {}
            path if path == "-" || !path.starts_with('-') => {
                if input_path.is_none() {
                    input_path = Some(path);
                }
            }
            _ => {}
        }
        i += 1;
    }

    let Some(input_path) = input_path else {
        print_usage();
        bail!("Mission or SVG file required");
    };

    let mission = load_mission(input_path, &input)?;
    let settings = mission.settings(&overrides)?;
    let planner = settings.planner();
    let field = Polygon::new(mission.boundary_points())?;
    let bound = field.outer_bound();
    let parts = planner.decompose(&field)?;
    let spec = field.sweep_spec(settings.spacing, settings.metric)?;

    println!("Field: {}", mission.name);
    println!("  Vertices:  {}", field.vertex_count());
    println!("  Kind:      {}", field.kind().name());
    println!(
        "  Bounds:    N {:.7}  S {:.7}  W {:.7}  E {:.7}",
        bound.north(),
        bound.south(),
        bound.west(),
        bound.east()
    );
    println!("  Center:    {:.7}, {:.7}", bound.center.lat, bound.center.lng);
    println!(
        "  Sweep:     {} rows at {} spacing ({})",
        spec.rows(),
        settings.spacing,
        settings.metric.name()
    );
    println!("  Rotation:  {}", settings.rotation.name());
    println!("  Parts:     {}", parts.len());
    for (n, part) in parts.iter().enumerate() {
        println!("    #{}: {} vertices", n + 1, part.vertex_count());
    }

    Ok(())
}

fn print_usage() {
    eprintln!("Usage: swath classify <mission.yaml|field.svg> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -s, --spacing <m>       Spacing used for the row count (default: mission or 20)");
    eprintln!("  --metric <name>         haversine, planar (default: haversine)");
    eprintln!("  --rotation <name>       local, planar, mercator (default: follows the metric)");
    eprintln!("  --origin <lat,lng>      SVG input: map position of pixel 0,0");
    eprintln!("  --zoom <z>              SVG input: Web Mercator zoom (default: 18)");
    eprintln!("  --field <n>             SVG input: which outline (default: 0)");
    eprintln!();
    eprintln!("Prints convexity, bounding box, sweep rows and convex parts.");
}
