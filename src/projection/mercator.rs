//! Mercator-family projections covering the whole world.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use crate::error::ProjectionError;
use crate::geo::{GeoPoint, GeoRect, PixelPoint, PixelSize};

use super::{
    clip, clip_to_bounds, Projection, DEFAULT_TILE_SIZE, MAX_GLOBAL_ZOOM, MERCATOR_MAX_LATITUDE,
    WGS84,
};

/// Convergence threshold of the ellipsoidal latitude solver (radians).
const LATITUDE_TOLERANCE: f64 = 1e-10;

/// Iteration cap of the ellipsoidal latitude solver.
const LATITUDE_MAX_ITERATIONS: usize = 15;

fn mercator_bounds() -> GeoRect {
    GeoRect::from_ltrb(
        -180.0,
        MERCATOR_MAX_LATITUDE,
        180.0,
        -MERCATOR_MAX_LATITUDE,
    )
}

/// Max tile index of a square `2^zoom` grid.
fn square_matrix_max(zoom: u8) -> PixelPoint {
    let n = (1_i64 << zoom) - 1;
    PixelPoint::new(n, n)
}

// =============================================================================
// Spherical Mercator
// =============================================================================

/// Spherical ("web") Mercator, the projection of most slippy-map providers.
///
/// # Example
///
/// ```
/// use tilekit::projection::{MercatorProjection, Projection};
/// use tilekit::geo::PixelPoint;
///
/// let mercator = MercatorProjection::new();
/// assert_eq!(mercator.from_lat_lng_to_pixel(0.0, 0.0, 0), PixelPoint::new(128, 128));
/// ```
#[derive(Debug, Clone)]
pub struct MercatorProjection {
    tile_size: PixelSize,
    max_zoom: u8,
}

impl MercatorProjection {
    /// Create a projection with 256 px tiles.
    pub fn new() -> Self {
        Self::with_tile_size(DEFAULT_TILE_SIZE)
    }

    /// Create a projection with square tiles of `size` pixels.
    pub fn with_tile_size(size: i64) -> Self {
        Self {
            tile_size: PixelSize::new(size, size),
            max_zoom: MAX_GLOBAL_ZOOM,
        }
    }
}

impl Default for MercatorProjection {
    fn default() -> Self {
        Self::new()
    }
}

impl Projection for MercatorProjection {
    fn name(&self) -> &'static str {
        "mercator"
    }

    fn bounds(&self) -> GeoRect {
        mercator_bounds()
    }

    fn tile_size(&self) -> PixelSize {
        self.tile_size
    }

    fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    fn from_lat_lng_to_pixel(&self, lat: f64, lng: f64, zoom: u8) -> PixelPoint {
        let zoom = zoom.min(self.max_zoom);
        let (lat, lng) = clip_to_bounds(lat, lng, &self.bounds());

        let x = (lng + 180.0) / 360.0;
        let sin_lat = lat.to_radians().sin();
        let y = 0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * PI);

        let size = self.tile_matrix_size_pixel(zoom);
        let (w, h) = (size.width as f64, size.height as f64);

        PixelPoint::new(
            clip(x * w + 0.5, 0.0, w - 1.0) as i64,
            clip(y * h + 0.5, 0.0, h - 1.0) as i64,
        )
    }

    fn from_pixel_to_lat_lng(
        &self,
        x: i64,
        y: i64,
        zoom: u8,
    ) -> Result<GeoPoint, ProjectionError> {
        let zoom = zoom.min(self.max_zoom);
        let size = self.tile_matrix_size_pixel(zoom);
        let (w, h) = (size.width as f64, size.height as f64);

        let xx = clip(x as f64, 0.0, w - 1.0) / w - 0.5;
        let yy = 0.5 - clip(y as f64, 0.0, h - 1.0) / h;

        Ok(GeoPoint::new(
            90.0 - 360.0 * (-yy * 2.0 * PI).exp().atan() / PI,
            360.0 * xx,
        ))
    }

    fn tile_matrix_min_xy(&self, _zoom: u8) -> PixelPoint {
        PixelPoint::new(0, 0)
    }

    fn tile_matrix_max_xy(&self, zoom: u8) -> PixelPoint {
        square_matrix_max(zoom.min(self.max_zoom))
    }
}

// =============================================================================
// Ellipsoidal Mercator
// =============================================================================

/// Mercator on the WGS84 ellipsoid (EPSG:3395).
///
/// Shares the tile grid of [`MercatorProjection`] but maps latitude through
/// the ellipsoid's isometric latitude, so the inverse needs an iterative
/// solver.
#[derive(Debug, Clone)]
pub struct EllipticalMercatorProjection {
    tile_size: PixelSize,
    max_zoom: u8,
    e: f64,
}

impl EllipticalMercatorProjection {
    pub fn new() -> Self {
        Self {
            tile_size: PixelSize::new(DEFAULT_TILE_SIZE, DEFAULT_TILE_SIZE),
            max_zoom: MAX_GLOBAL_ZOOM,
            e: WGS84.e(),
        }
    }

    /// Latitude (radians) from the isometric-latitude term `t = exp(-y)`.
    fn solve_latitude(&self, t: f64) -> Result<f64, ProjectionError> {
        let half_e = self.e / 2.0;
        let mut phi = FRAC_PI_2 - 2.0 * t.atan();

        for _ in 0..LATITUDE_MAX_ITERATIONS {
            let con = self.e * phi.sin();
            let next = FRAC_PI_2 - 2.0 * (t * ((1.0 - con) / (1.0 + con)).powf(half_e)).atan();
            let delta = next - phi;
            phi = next;

            if delta.abs() < LATITUDE_TOLERANCE {
                return Ok(phi);
            }
        }

        Err(ProjectionError::NoConvergence {
            stage: "elliptical mercator latitude",
            iterations: LATITUDE_MAX_ITERATIONS,
        })
    }
}

impl Default for EllipticalMercatorProjection {
    fn default() -> Self {
        Self::new()
    }
}

impl Projection for EllipticalMercatorProjection {
    fn name(&self) -> &'static str {
        "elliptical-mercator"
    }

    fn bounds(&self) -> GeoRect {
        mercator_bounds()
    }

    fn tile_size(&self) -> PixelSize {
        self.tile_size
    }

    fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    fn from_lat_lng_to_pixel(&self, lat: f64, lng: f64, zoom: u8) -> PixelPoint {
        let zoom = zoom.min(self.max_zoom);
        let (lat, lng) = clip_to_bounds(lat, lng, &self.bounds());

        let phi = lat.to_radians();
        let con = self.e * phi.sin();
        let ts = (FRAC_PI_4 + phi / 2.0).tan() * ((1.0 - con) / (1.0 + con)).powf(self.e / 2.0);

        let x = (lng + 180.0) / 360.0;
        let y = 0.5 - ts.ln() / (2.0 * PI);

        let size = self.tile_matrix_size_pixel(zoom);
        let (w, h) = (size.width as f64, size.height as f64);

        PixelPoint::new(
            clip((x * w).floor(), 0.0, w - 1.0) as i64,
            clip((y * h).floor(), 0.0, h - 1.0) as i64,
        )
    }

    fn from_pixel_to_lat_lng(
        &self,
        x: i64,
        y: i64,
        zoom: u8,
    ) -> Result<GeoPoint, ProjectionError> {
        let zoom = zoom.min(self.max_zoom);
        let size = self.tile_matrix_size_pixel(zoom);
        let (w, h) = (size.width as f64, size.height as f64);

        let xx = clip(x as f64, 0.0, w - 1.0) / w - 0.5;
        let yy = 0.5 - clip(y as f64, 0.0, h - 1.0) / h;

        let phi = self.solve_latitude((-yy * 2.0 * PI).exp())?;

        Ok(GeoPoint::new(phi.to_degrees(), 360.0 * xx))
    }

    fn tile_matrix_min_xy(&self, _zoom: u8) -> PixelPoint {
        PixelPoint::new(0, 0)
    }

    fn tile_matrix_max_xy(&self, zoom: u8) -> PixelPoint {
        square_matrix_max(zoom.min(self.max_zoom))
    }
}
