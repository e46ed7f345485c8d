//! Benchmark command implementation.

use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use swath::{DetourKind, PlanMode};

use super::common::{InputOptions, load_mission, parse_number, parse_origin};
use super::mission::Overrides;

/// Execute the benchmark command.
pub fn cmd_benchmark(args: &[String]) -> Result<()> {
    let mut input_path: Option<&str> = None;
    let mut iterations: u32 = 20;
    let mut overrides = Overrides::default();
    let mut input = InputOptions::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-n" | "--iterations" => {
                i += 1;
                if i < args.len() {
                    iterations = args[i].parse().unwrap_or(20).max(1);
                }
            }
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
            path if !path.starts_with('-') => {
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

    let start_load = Instant::now();
    let mission = load_mission(input_path, &input)?;
    let boundary = mission.boundary_points();
    println!("Loaded '{}' ({} vertices) in {:?}", mission.name, boundary.len(), start_load.elapsed());

    // Every mode, plus stitched with each detour strategy
    let mut runs: Vec<(String, PlanMode, DetourKind)> = Vec::new();
    for &mode in PlanMode::all() {
        if mode == PlanMode::Stitched {
            for &detour in DetourKind::all() {
                runs.push((format!("{} ({})", mode.name(), detour.name()), mode, detour));
            }
        } else {
            runs.push((mode.name().to_string(), mode, DetourKind::default()));
        }
    }

    let base = mission.settings(&overrides)?;
    println!("\nRunning {} iterations per mode at {} spacing...", iterations, base.spacing);

    let mut results: Vec<(String, usize, Duration)> = Vec::new();
    for (label, mode, detour) in runs {
        let settings = mission.settings(&Overrides {
            mode: Some(mode.name().to_string()),
            detour: Some(detour.name().to_string()),
            ..overrides.clone()
        })?;
        let planner = settings.planner();

        let start = Instant::now();
        let mut waypoints = 0;
        for _ in 0..iterations {
            let route = planner
                .plan(&boundary, settings.spacing, settings.angle, settings.mode)
                .with_context(|| format!("{} failed", label))?;
            waypoints = route.len();
        }
        results.push((label, waypoints, start.elapsed() / iterations));
    }

    println!();
    println!("═══════════════════════════════════════════════");
    println!("  SWATH BENCHMARK: {}", mission.name.to_uppercase());
    println!("═══════════════════════════════════════════════");
    println!("  Vertices: {}", boundary.len());
    println!("  Iterations: {}", iterations);
    for (label, waypoints, avg) in &results {
        println!(
            "  {:<22} {:>6} waypoints  {:>9.3}ms",
            label,
            waypoints,
            avg.as_secs_f64() * 1000.0
        );
    }
    println!("═══════════════════════════════════════════════");

    Ok(())
}

fn print_usage() {
    eprintln!("Usage: swath benchmark <mission.yaml|field.svg> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -n, --iterations <n>    Runs per mode (default: 20)");
    eprintln!("  -s, --spacing <m>       Sweep spacing (default: mission or 20)");
    eprintln!("  -a, --angle <deg>       Sweep heading (default: mission or 0)");
    eprintln!("  --metric <name>         haversine, planar");
    eprintln!("  --rotation <name>       local, planar, mercator (default: follows the metric)");
    eprintln!("  --origin, --zoom, --field  SVG input, as for 'swath plan'");
    eprintln!();
    eprintln!("Times every planning mode on the same field.");
}
