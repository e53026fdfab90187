//! Command-line configuration for the `tilekit` binary.
//!
//! The binary exposes the projection toolkit as a handful of subcommands:
//!
//! - `project` - lat/lng to pixel and tile at a zoom level
//! - `unproject` - pixel to lat/lng at a zoom level
//! - `matrix` - tile matrix bounds and ground resolution per zoom level
//! - `tiles` - tile indices covering a lat/lng rectangle
//!
//! # Environment Variables
//!
//! - `TILEKIT_PROJECTION` - Projection used when `--projection` is omitted (default: mercator)
//! - `TILEKIT_FORMAT` - Output format, `text` or `json` (default: text)
//! - `RUST_LOG` - Overrides the log filter set by `--verbose`

use clap::{Parser, Subcommand, ValueEnum};

use crate::geo::GeoRect;
use crate::projection::{Projection, ProjectionKind};

// =============================================================================
// CLI Arguments
// =============================================================================

/// tilekit - map tile projection toolkit.
#[derive(Parser, Debug, Clone)]
#[command(name = "tilekit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Output format.
    #[arg(
        long,
        value_enum,
        global = true,
        default_value_t = OutputFormat::Text,
        env = "TILEKIT_FORMAT"
    )]
    pub format: OutputFormat,
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Convert a lat/lng to pixel and tile coordinates
    Project(ProjectConfig),

    /// Convert pixel coordinates back to lat/lng
    Unproject(UnprojectConfig),

    /// Print tile matrix bounds for a range of zoom levels
    Matrix(MatrixConfig),

    /// List the tiles covering a lat/lng rectangle
    Tiles(TilesConfig),
}

impl Command {
    /// Validate the selected command's arguments.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Command::Project(config) => config.validate(),
            Command::Unproject(config) => config.validate(),
            Command::Matrix(config) => config.validate(),
            Command::Tiles(config) => config.validate(),
        }
    }
}

/// Largest tile list the `tiles` command will print.
pub const MAX_TILE_LIST: i64 = 1_000_000;

fn check_zoom(projection: &dyn Projection, zoom: u8) -> Result<(), String> {
    if zoom > projection.max_zoom() {
        return Err(format!(
            "zoom {} is beyond the deepest level of {} ({})",
            zoom,
            projection.name(),
            projection.max_zoom()
        ));
    }
    Ok(())
}

fn check_lat_lng(lat: f64, lng: f64) -> Result<(), String> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(format!("latitude must be between -90 and 90, got {}", lat));
    }
    if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
        return Err(format!("longitude must be between -180 and 180, got {}", lng));
    }
    Ok(())
}

// =============================================================================
// Project
// =============================================================================

#[derive(Parser, Debug, Clone)]
pub struct ProjectConfig {
    /// Projection to use.
    #[arg(long, value_enum, default_value_t = ProjectionKind::Mercator, env = "TILEKIT_PROJECTION")]
    pub projection: ProjectionKind,

    /// Latitude in degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude in degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub lng: f64,

    /// Zoom level.
    #[arg(short, long)]
    pub zoom: u8,
}

impl ProjectConfig {
    pub fn validate(&self) -> Result<(), String> {
        check_lat_lng(self.lat, self.lng)?;
        check_zoom(self.projection.build().as_ref(), self.zoom)
    }
}

// =============================================================================
// Unproject
// =============================================================================

#[derive(Parser, Debug, Clone)]
pub struct UnprojectConfig {
    /// Projection to use.
    #[arg(long, value_enum, default_value_t = ProjectionKind::Mercator, env = "TILEKIT_PROJECTION")]
    pub projection: ProjectionKind,

    /// Pixel column.
    #[arg(short, long, allow_hyphen_values = true)]
    pub x: i64,

    /// Pixel row.
    #[arg(short, long, allow_hyphen_values = true)]
    pub y: i64,

    /// Zoom level.
    #[arg(short, long)]
    pub zoom: u8,
}

impl UnprojectConfig {
    pub fn validate(&self) -> Result<(), String> {
        check_zoom(self.projection.build().as_ref(), self.zoom)
    }
}

// =============================================================================
// Matrix
// =============================================================================

#[derive(Parser, Debug, Clone)]
pub struct MatrixConfig {
    /// Projection to use.
    #[arg(long, value_enum, default_value_t = ProjectionKind::Mercator, env = "TILEKIT_PROJECTION")]
    pub projection: ProjectionKind,

    /// First zoom level to print.
    #[arg(long, default_value_t = 0)]
    pub min_zoom: u8,

    /// Last zoom level to print (defaults to the projection's deepest level).
    #[arg(long)]
    pub max_zoom: Option<u8>,
}

impl MatrixConfig {
    pub fn validate(&self) -> Result<(), String> {
        let projection = self.projection.build();
        check_zoom(projection.as_ref(), self.min_zoom)?;

        if let Some(max_zoom) = self.max_zoom {
            check_zoom(projection.as_ref(), max_zoom)?;
            if max_zoom < self.min_zoom {
                return Err(format!(
                    "max_zoom ({}) must not be below min_zoom ({})",
                    max_zoom, self.min_zoom
                ));
            }
        }
        Ok(())
    }

    /// Zoom levels to print, with the upper end resolved against `projection`.
    pub fn zoom_range(&self, projection: &dyn Projection) -> std::ops::RangeInclusive<u8> {
        self.min_zoom..=self.max_zoom.unwrap_or(projection.max_zoom())
    }
}

// =============================================================================
// Tiles
// =============================================================================

#[derive(Parser, Debug, Clone)]
pub struct TilesConfig {
    /// Projection to use.
    #[arg(long, value_enum, default_value_t = ProjectionKind::Mercator, env = "TILEKIT_PROJECTION")]
    pub projection: ProjectionKind,

    /// Northern edge in degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub top: f64,

    /// Western edge in degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub left: f64,

    /// Southern edge in degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub bottom: f64,

    /// Eastern edge in degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub right: f64,

    /// Zoom level.
    #[arg(short, long)]
    pub zoom: u8,

    /// Extra tiles to include on every side.
    #[arg(long, default_value_t = 0)]
    pub padding: i64,
}

impl TilesConfig {
    pub fn validate(&self) -> Result<(), String> {
        check_lat_lng(self.top, self.left)?;
        check_lat_lng(self.bottom, self.right)?;

        if self.top <= self.bottom {
            return Err("top must be north of bottom".to_string());
        }
        if self.right <= self.left {
            return Err("right must be east of left".to_string());
        }
        if self.padding < 0 {
            return Err("padding must not be negative".to_string());
        }

        let projection = self.projection.build();
        check_zoom(projection.as_ref(), self.zoom)?;

        let count = projection.area_tile_count(&self.rect(), self.zoom, self.padding);
        if count > MAX_TILE_LIST {
            return Err(format!(
                "area covers {} tiles at zoom {}, the limit is {}",
                count, self.zoom, MAX_TILE_LIST
            ));
        }
        Ok(())
    }

    pub fn rect(&self) -> GeoRect {
        GeoRect::from_ltrb(self.left, self.top, self.right, self.bottom)
    }
}

// =============================================================================
// Tests
// =============================================================================
