//! Cartographic projections for tile grids.
//!
//! A [`Projection`] converts between geographic coordinates (degrees) and the
//! pixel space of one zoom level's full raster, and reports which tile indices
//! exist at each zoom level.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                      Projection (trait)                       │
//! │  bounds · tile_size · forward · inverse · tile matrix · res   │
//! └───────────────┬───────────────────────────────┬───────────────┘
//!                 │                               │
//!     global (closed form)             regional grids (lazy extents)
//!                 │                               │
//!   ┌─────────────┼──────────────┐     ┌──────────┼────────────┐
//!   ▼             ▼              ▼     ▼          ▼            ▼
//! Mercator  EllipticalMercator  Plate  Swiss     LKS-94     SWEREF 99
//!                              Carrée  (LV03)       │            │
//!                                                   └─────┬──────┘
//!                                                         ▼
//!                                     geodetic ⇄ geocentric ⇄ transverse Mercator
//! ```
//!
//! Forward transforms clamp their input into [`Projection::bounds`] and never
//! fail. Inverse transforms of the ellipsoidal projections run iterative
//! solvers and return [`ProjectionError::NoConvergence`] when a solver exceeds
//! its iteration cap.

mod ellipsoid;
mod extents;
mod lks94;
mod mercator;
mod plate_carree;
mod swiss;
mod sweref99;
mod transverse;

use std::f64::consts::PI;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;
use crate::geo::{GeoPoint, GeoRect, PixelPoint, PixelSize};

pub use ellipsoid::{Ellipsoid, GRS80, WGS84};
pub use extents::TileExtent;
pub use lks94::Lks94Projection;
pub use mercator::{EllipticalMercatorProjection, MercatorProjection};
pub use plate_carree::PlateCarreeProjection;
pub use swiss::SwissProjection;
pub use sweref99::Sweref99Projection;
pub use transverse::TransverseMercator;

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: i64 = 256;

/// Deepest zoom level supported by the global projections.
pub const MAX_GLOBAL_ZOOM: u8 = 24;

/// Latitude at which the web Mercator world becomes square.
pub const MERCATOR_MAX_LATITUDE: f64 = 85.05112878;

// =============================================================================
// Projection Trait
// =============================================================================

/// Conversion between geographic coordinates and tile-grid pixel space.
///
/// Implementations are immutable once constructed, apart from per-zoom lookup
/// tables that are built once on first use and never change afterwards, so a
/// projection can be shared freely across threads behind an `Arc`.
pub trait Projection: Send + Sync {
    /// Short identifier, used in logs and CLI output.
    fn name(&self) -> &'static str;

    /// Lat/lng rectangle this projection is valid for.
    fn bounds(&self) -> GeoRect;

    /// Pixel dimensions of one tile.
    fn tile_size(&self) -> PixelSize;

    /// Semi-major axis of the reference ellipsoid in meters.
    fn axis(&self) -> f64 {
        WGS84.a
    }

    /// Flattening of the reference ellipsoid.
    fn flattening(&self) -> f64 {
        WGS84.f
    }

    /// Deepest zoom level this projection supports. Larger zooms are clamped.
    fn max_zoom(&self) -> u8;

    /// Forward transform: lat/lng (degrees) to pixel at `zoom`.
    ///
    /// The input is clamped into [`Projection::bounds`] first.
    fn from_lat_lng_to_pixel(&self, lat: f64, lng: f64, zoom: u8) -> PixelPoint;

    /// Inverse transform: pixel at `zoom` to lat/lng (degrees).
    fn from_pixel_to_lat_lng(&self, x: i64, y: i64, zoom: u8)
        -> Result<GeoPoint, ProjectionError>;

    /// Smallest tile index at `zoom` (inclusive).
    fn tile_matrix_min_xy(&self, zoom: u8) -> PixelPoint;

    /// Largest tile index at `zoom` (inclusive).
    fn tile_matrix_max_xy(&self, zoom: u8) -> PixelPoint;

    /// Meters per pixel at `zoom` and `latitude`.
    fn ground_resolution(&self, zoom: u8, latitude: f64) -> f64 {
        (latitude.to_radians().cos() * 2.0 * PI * self.axis())
            / self.tile_matrix_size_pixel(zoom).width as f64
    }

    // =========================================================================
    // Provided helpers
    // =========================================================================

    /// Forward transform of a [`GeoPoint`].
    fn from_lat_lng_to_pixel_point(&self, point: GeoPoint, zoom: u8) -> PixelPoint {
        self.from_lat_lng_to_pixel(point.lat, point.lng, zoom)
    }

    /// Inverse transform of a [`PixelPoint`].
    fn from_pixel_to_lat_lng_point(
        &self,
        pixel: PixelPoint,
        zoom: u8,
    ) -> Result<GeoPoint, ProjectionError> {
        self.from_pixel_to_lat_lng(pixel.x, pixel.y, zoom)
    }

    /// Tile index containing the given pixel.
    fn from_pixel_to_tile_xy(&self, pixel: PixelPoint) -> PixelPoint {
        let size = self.tile_size();
        PixelPoint::new(
            pixel.x.div_euclid(size.width),
            pixel.y.div_euclid(size.height),
        )
    }

    /// Top-left pixel of the given tile.
    fn from_tile_xy_to_pixel(&self, tile: PixelPoint) -> PixelPoint {
        let size = self.tile_size();
        PixelPoint::new(tile.x * size.width, tile.y * size.height)
    }

    /// Number of tiles along each axis at `zoom`.
    fn tile_matrix_size_xy(&self, zoom: u8) -> PixelSize {
        let min = self.tile_matrix_min_xy(zoom);
        let max = self.tile_matrix_max_xy(zoom);
        PixelSize::new(max.x - min.x + 1, max.y - min.y + 1)
    }

    /// Total number of tiles at `zoom`.
    fn tile_matrix_item_count(&self, zoom: u8) -> i64 {
        let size = self.tile_matrix_size_xy(zoom);
        size.width * size.height
    }

    /// Size of the tile matrix in pixels at `zoom`.
    fn tile_matrix_size_pixel(&self, zoom: u8) -> PixelSize {
        let tiles = self.tile_matrix_size_xy(zoom);
        let tile = self.tile_size();
        PixelSize::new(tiles.width * tile.width, tiles.height * tile.height)
    }

    /// Tile indices covering `rect` at `zoom`, grown by `padding` tiles on
    /// every side and clipped to the tile matrix. Ordered column by column.
    ///
    /// Callers taking `rect` or `padding` from user input should bound the
    /// result with [`Projection::area_tile_count`] first.
    fn area_tile_list(&self, rect: &GeoRect, zoom: u8, padding: i64) -> Vec<PixelPoint> {
        let (start, end) = area_tile_range(self, rect, zoom, padding);

        let mut tiles = Vec::new();
        for x in start.x..=end.x {
            for y in start.y..=end.y {
                tiles.push(PixelPoint::new(x, y));
            }
        }
        tiles
    }

    /// Number of tiles [`Projection::area_tile_list`] would return, without
    /// building the list.
    fn area_tile_count(&self, rect: &GeoRect, zoom: u8, padding: i64) -> i64 {
        let (start, end) = area_tile_range(self, rect, zoom, padding);
        if end.x < start.x || end.y < start.y {
            return 0;
        }
        (end.x - start.x + 1).saturating_mul(end.y - start.y + 1)
    }
}

/// Inclusive tile range covering `rect` plus `padding`, clipped to the matrix.
fn area_tile_range<P: Projection + ?Sized>(
    projection: &P,
    rect: &GeoRect,
    zoom: u8,
    padding: i64,
) -> (PixelPoint, PixelPoint) {
    let top_left = projection
        .from_pixel_to_tile_xy(projection.from_lat_lng_to_pixel_point(rect.top_left(), zoom));
    let bottom_right = projection
        .from_pixel_to_tile_xy(projection.from_lat_lng_to_pixel_point(rect.bottom_right(), zoom));

    let min = projection.tile_matrix_min_xy(zoom);
    let max = projection.tile_matrix_max_xy(zoom);
    let padding = padding.max(0);

    (
        PixelPoint::new(
            top_left.x.min(bottom_right.x).saturating_sub(padding).max(min.x),
            top_left.y.min(bottom_right.y).saturating_sub(padding).max(min.y),
        ),
        PixelPoint::new(
            top_left.x.max(bottom_right.x).saturating_add(padding).min(max.x),
            top_left.y.max(bottom_right.y).saturating_add(padding).min(max.y),
        ),
    )
}

// =============================================================================
// Free helpers
// =============================================================================

/// Clamp `n` into `[min, max]`.
#[inline]
pub fn clip(n: f64, min: f64, max: f64) -> f64 {
    n.max(min).min(max)
}

/// Clamp a lat/lng pair into `bounds`.
#[inline]
pub(crate) fn clip_to_bounds(lat: f64, lng: f64, bounds: &GeoRect) -> (f64, f64) {
    (
        clip(lat, bounds.bottom(), bounds.top()),
        clip(lng, bounds.left(), bounds.right()),
    )
}

/// Great-circle distance in kilometers (haversine on the WGS84 semi-major axis).
pub fn distance_km(p1: GeoPoint, p2: GeoPoint) -> f64 {
    let lat1 = p1.lat.to_radians();
    let lat2 = p2.lat.to_radians();
    let d_lat = lat2 - lat1;
    let d_lng = (p2.lng - p1.lng).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    (WGS84.a / 1000.0) * c
}

/// Initial bearing from `p1` to `p2` in degrees, normalized to `[0, 360)`.
pub fn bearing(p1: GeoPoint, p2: GeoPoint) -> f64 {
    let lat1 = p1.lat.to_radians();
    let lat2 = p2.lat.to_radians();
    let d_lng = (p2.lng - p1.lng).to_radians();

    let y = d_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lng.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

// =============================================================================
// Projection Kind
// =============================================================================

/// The projections shipped with this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectionKind {
    /// Spherical web Mercator (EPSG:3857)
    Mercator,
    /// Ellipsoidal Mercator on WGS84 (EPSG:3395)
    EllipticalMercator,
    /// Equirectangular (EPSG:4326) with 512 px tiles
    PlateCarree,
    /// Swiss CH1903 / LV03 grid
    Swiss,
    /// Lithuanian LKS-94 transverse Mercator grid
    Lks94,
    /// Swedish SWEREF 99 TM grid
    Sweref99,
}

impl ProjectionKind {
    /// All known projections.
    pub const ALL: [ProjectionKind; 6] = [
        ProjectionKind::Mercator,
        ProjectionKind::EllipticalMercator,
        ProjectionKind::PlateCarree,
        ProjectionKind::Swiss,
        ProjectionKind::Lks94,
        ProjectionKind::Sweref99,
    ];

    /// Construct a shareable projection instance.
    pub fn build(self) -> Arc<dyn Projection> {
        match self {
            ProjectionKind::Mercator => Arc::new(MercatorProjection::new()),
            ProjectionKind::EllipticalMercator => Arc::new(EllipticalMercatorProjection::new()),
            ProjectionKind::PlateCarree => Arc::new(PlateCarreeProjection::new()),
            ProjectionKind::Swiss => Arc::new(SwissProjection::new()),
            ProjectionKind::Lks94 => Arc::new(Lks94Projection::new()),
            ProjectionKind::Sweref99 => Arc::new(Sweref99Projection::new()),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
