//! tilekit - map tile projection toolkit.
//!
//! This binary exposes the projections as command-line conversions.

use clap::Parser;
use serde::Serialize;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tilekit::{
    config::{
        Cli, Command, MatrixConfig, OutputFormat, ProjectConfig, TilesConfig, UnprojectConfig,
    },
    geo::{GeoPoint, PixelPoint, PixelSize},
    projection::Projection,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = cli.command.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let format = cli.format;
    let result = match cli.command {
        Command::Project(config) => run_project(config, format),
        Command::Unproject(config) => run_unproject(config, format),
        Command::Matrix(config) => run_matrix(config, format),
        Command::Tiles(config) => run_tiles(config, format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "tilekit=debug"
    } else {
        "tilekit=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Print `value` as pretty JSON, or each of `lines` in text mode.
fn emit<T: Serialize>(format: OutputFormat, value: &T, lines: Vec<String>) -> Result<(), String> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)
                .map_err(|e| format!("Failed to serialize output: {}", e))?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            for line in lines {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

// =============================================================================
// Project Command
// =============================================================================

#[derive(Serialize)]
struct ProjectOutput {
    projection: &'static str,
    zoom: u8,
    input: GeoPoint,
    pixel: PixelPoint,
    tile: PixelPoint,
    ground_resolution: f64,
}

fn run_project(config: ProjectConfig, format: OutputFormat) -> Result<(), String> {
    let projection = config.projection.build();
    let zoom = config.zoom;

    let pixel = projection.from_lat_lng_to_pixel(config.lat, config.lng, zoom);
    let tile = projection.from_pixel_to_tile_xy(pixel);
    debug!(projection = projection.name(), zoom, %pixel, %tile, "Projected point");

    let output = ProjectOutput {
        projection: projection.name(),
        zoom,
        input: GeoPoint::new(config.lat, config.lng),
        pixel,
        tile,
        ground_resolution: projection.ground_resolution(zoom, config.lat),
    };

    let lines = vec![
        format!("projection: {}", output.projection),
        format!("zoom:       {}", zoom),
        format!("pixel:      {}", pixel),
        format!("tile:       {}", tile),
        format!("resolution: {:.6} m/px", output.ground_resolution),
    ];
    emit(format, &output, lines)
}

// =============================================================================
// Unproject Command
// =============================================================================

#[derive(Serialize)]
struct UnprojectOutput {
    projection: &'static str,
    zoom: u8,
    pixel: PixelPoint,
    point: GeoPoint,
}

fn run_unproject(config: UnprojectConfig, format: OutputFormat) -> Result<(), String> {
    let projection = config.projection.build();
    let pixel = PixelPoint::new(config.x, config.y);

    let point = projection
        .from_pixel_to_lat_lng_point(pixel, config.zoom)
        .map_err(|e| format!("Cannot unproject {}: {}", pixel, e))?;

    let output = UnprojectOutput {
        projection: projection.name(),
        zoom: config.zoom,
        pixel,
        point,
    };

    let lines = vec![
        format!("projection: {}", output.projection),
        format!("zoom:       {}", config.zoom),
        format!("lat:        {:.8}", point.lat),
        format!("lng:        {:.8}", point.lng),
    ];
    emit(format, &output, lines)
}

// =============================================================================
// Matrix Command
// =============================================================================

#[derive(Serialize)]
struct MatrixLevel {
    zoom: u8,
    min: PixelPoint,
    max: PixelPoint,
    size: PixelSize,
    tiles: i64,
    ground_resolution: f64,
}

#[derive(Serialize)]
struct MatrixOutput {
    projection: &'static str,
    tile_size: PixelSize,
    levels: Vec<MatrixLevel>,
}

fn run_matrix(config: MatrixConfig, format: OutputFormat) -> Result<(), String> {
    let projection = config.projection.build();
    let center_lat = projection.bounds().center().lat;

    let levels: Vec<MatrixLevel> = config
        .zoom_range(projection.as_ref())
        .map(|zoom| MatrixLevel {
            zoom,
            min: projection.tile_matrix_min_xy(zoom),
            max: projection.tile_matrix_max_xy(zoom),
            size: projection.tile_matrix_size_xy(zoom),
            tiles: projection.tile_matrix_item_count(zoom),
            ground_resolution: projection.ground_resolution(zoom, center_lat),
        })
        .collect();

    let lines = levels
        .iter()
        .map(|level| {
            format!(
                "z{:<2}  min {:<16}  max {:<16}  {:>12} tiles  {:>14.4} m/px",
                level.zoom,
                level.min.to_string(),
                level.max.to_string(),
                level.tiles,
                level.ground_resolution
            )
        })
        .collect();

    let output = MatrixOutput {
        projection: projection.name(),
        tile_size: projection.tile_size(),
        levels,
    };
    emit(format, &output, lines)
}

// =============================================================================
// Tiles Command
// =============================================================================

#[derive(Serialize)]
struct TilesOutput {
    projection: &'static str,
    zoom: u8,
    count: usize,
    tiles: Vec<PixelPoint>,
}

fn run_tiles(config: TilesConfig, format: OutputFormat) -> Result<(), String> {
    let projection = config.projection.build();
    let tiles = projection.area_tile_list(&config.rect(), config.zoom, config.padding);
    debug!(count = tiles.len(), "Listed tiles");

    let mut lines: Vec<String> = tiles
        .iter()
        .map(|t| format!("{}/{}/{}", config.zoom, t.x, t.y))
        .collect();
    lines.push(format!("{} tile(s)", tiles.len()));

    let output = TilesOutput {
        projection: projection.name(),
        zoom: config.zoom,
        count: tiles.len(),
        tiles,
    };
    emit(format, &output, lines)
}
