//! Common utilities shared across CLI commands.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use swath::{Point, Renderer, SvgRenderer, WebMercator, extract_boundaries_from_svg, render_route};

use super::mission::Mission;

/// Canvas size for SVG and PNG output, in pixels.
pub const CANVAS_WIDTH: f64 = 960.0;
pub const CANVAS_HEIGHT: f64 = 720.0;
const CANVAS_PADDING: f64 = 32.0;

/// Zoom level assumed for SVG outlines unless `--zoom` says otherwise.
pub const DEFAULT_SVG_ZOOM: f64 = 18.0;

/// Output format for a planned route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Json,
    Svg,
    Png,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Option<OutputFormat> {
        match name.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "svg" => Some(OutputFormat::Svg),
            "png" => Some(OutputFormat::Png),
            _ => None,
        }
    }
}

/// How to read an input file.
///
/// Mission files carry lat/lng directly. SVG outlines are in screen pixels
/// and need the map position of pixel (0, 0) plus the zoom they were
/// drawn at.
#[derive(Debug, Clone, Copy)]
pub struct InputOptions {
    pub zoom: f64,
    pub origin: Option<Point>,
    /// Which outline of a multi-field SVG to use
    pub field: usize,
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_SVG_ZOOM,
            origin: None,
            field: 0,
        }
    }
}

/// True if `path` names SVG input (`-` means SVG on stdin).
pub fn is_svg_input(path: &str) -> bool {
    path == "-"
        || Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("svg"))
}

/// Load a mission from a mission file or an SVG outline.
pub fn load_mission(path: &str, options: &InputOptions) -> Result<Mission> {
    if !is_svg_input(path) {
        eprintln!("Loading: {}", path);
        return Mission::load(path);
    }

    let svg_content = if path == "-" {
        eprintln!("Reading SVG from stdin...");
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    } else {
        eprintln!("Loading: {}", path);
        fs::read_to_string(path).with_context(|| format!("Failed to read SVG file {}", path))?
    };

    let Some(origin) = options.origin else {
        bail!("SVG input needs --origin <lat,lng>, the map position of pixel 0,0");
    };

    let projection = WebMercator::new(options.zoom, origin);
    let boundaries = extract_boundaries_from_svg(&svg_content, &projection)
        .context("Failed to import field outline")?;

    let boundary = boundaries.get(options.field).ok_or_else(|| {
        anyhow!(
            "SVG has {} outline(s), there is no field #{}",
            boundaries.len(),
            options.field
        )
    })?;
    eprintln!(
        "Loaded {} outline(s), using #{} ({} vertices)",
        boundaries.len(),
        options.field,
        boundary.len()
    );

    let name = Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("stdin");
    Ok(Mission::from_boundary(name, boundary))
}

/// Parse `"lat,lng"`.
pub fn parse_origin(value: &str) -> Result<Point> {
    let (lat, lng) = value
        .split_once(',')
        .ok_or_else(|| anyhow!("Origin must look like <lat,lng>, got '{}'", value))?;
    let lat: f64 = lat.trim().parse().with_context(|| format!("Bad latitude '{}'", lat))?;
    let lng: f64 = lng.trim().parse().with_context(|| format!("Bad longitude '{}'", lng))?;
    Ok(Point::new(lat, lng))
}

/// Parse a numeric flag value.
pub fn parse_number(flag: &str, value: &str) -> Result<f64> {
    value
        .parse()
        .with_context(|| format!("{} expects a number, got '{}'", flag, value))
}

/// Draw boundary and route on a map that fits them both.
pub fn route_to_svg(boundary: &[Point], route: &[Point], numbered: bool) -> String {
    let mut extent = boundary.to_vec();
    extent.extend_from_slice(route);

    let projection = WebMercator::fit(&extent, CANVAS_WIDTH, CANVAS_HEIGHT, CANVAS_PADDING);
    let mut renderer = SvgRenderer::new(projection, CANVAS_WIDTH, CANVAS_HEIGHT);
    renderer.draw_boundary(boundary);
    render_route(&mut renderer, route, numbered);
    renderer.finish()
}

/// Rasterize SVG content to a PNG file using resvg.
pub fn generate_png(svg_content: &str, png_path: &str, scale: f64) -> Result<()> {
    use resvg::usvg;
    use tiny_skia::Pixmap;

    eprint!("Generating PNG at {}x scale...", scale);

    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg_content, &options).context("Failed to parse route SVG")?;

    let size = tree.size();
    let pixmap_width = (size.width() as f64 * scale).ceil() as u32;
    let pixmap_height = (size.height() as f64 * scale).ceil() as u32;

    let mut pixmap = Pixmap::new(pixmap_width, pixmap_height)
        .ok_or_else(|| anyhow!("Could not create a {}x{} pixmap", pixmap_width, pixmap_height))?;

    pixmap.fill(tiny_skia::Color::WHITE);

    let transform = tiny_skia::Transform::from_scale(scale as f32, scale as f32);
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    pixmap
        .save_png(png_path)
        .with_context(|| format!("Failed to write {}", png_path))?;
    eprintln!(" done!\nWrote: {} ({}x{})", png_path, pixmap_width, pixmap_height);
    Ok(())
}

/// Write to a file, or stdout for `None` and `-`.
pub fn write_output(output_path: Option<&str>, content: &str) -> Result<()> {
    match output_path {
        Some("-") | None => {
            println!("{}", content);
        }
        Some(path) => {
            fs::write(path, content).with_context(|| format!("Failed to write output file {}", path))?;
            eprintln!("Wrote: {}", path);
        }
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
