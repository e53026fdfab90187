//! Swiss CH1903 / LV03 grid (EPSG:21781).
//!
//! Uses the swisstopo approximate polynomials. The published inverse is only
//! accurate to about a meter, so [`SwissProjection::to_lat_lng`] refines it
//! against the forward polynomial.

use crate::error::ProjectionError;
use crate::geo::{GeoPoint, GeoRect, PixelPoint, PixelSize};

use super::extents::{corner_extent, ExtentTable, TileExtent};
use super::{clip_to_bounds, Projection, DEFAULT_TILE_SIZE};

const ORIGIN_X: f64 = 420_000.0;
const ORIGIN_Y: f64 = 350_000.0;

const RESOLUTIONS: [f64; 27] = [
    4000.0, 3750.0, 3500.0, 3250.0, 3000.0, 2750.0, 2500.0, 2250.0, 2000.0, 1750.0, 1500.0,
    1250.0, 1000.0, 750.0, 650.0, 500.0, 250.0, 100.0, 50.0, 20.0, 10.0, 5.0, 2.5, 2.0, 1.5, 1.0,
    0.5,
];

/// Inverse refinement stops once both corrections drop below this (degrees).
const INVERSE_TOLERANCE: f64 = 1e-10;
const INVERSE_MAX_ITERATIONS: usize = 10;

/// CH1903 / LV03 with the swisstopo tile pyramid.
#[derive(Debug)]
pub struct SwissProjection {
    extents: ExtentTable,
}

impl SwissProjection {
    pub fn new() -> Self {
        Self {
            extents: ExtentTable::new(RESOLUTIONS.len()),
        }
    }

    fn resolution(zoom: u8) -> f64 {
        RESOLUTIONS[usize::from(zoom).min(RESOLUTIONS.len() - 1)]
    }

    fn extent(&self, zoom: u8) -> TileExtent {
        let zoom = zoom.min(self.max_zoom());
        self.extents
            .get_or_build(usize::from(zoom), || corner_extent(self, zoom))
    }

    /// WGS84 degrees to LV03 (easting, northing).
    pub fn to_grid(lat: f64, lng: f64) -> (f64, f64) {
        let phi = (lat * 3600.0 - 169_028.66) / 10_000.0;
        let lambda = (lng * 3600.0 - 26_782.5) / 10_000.0;

        let easting = 600_072.37 + 211_455.93 * lambda
            - 10_938.51 * lambda * phi
            - 0.36 * lambda * phi * phi
            - 44.54 * lambda.powi(3);

        let northing = 200_147.07 + 308_807.95 * phi + 3_745.25 * lambda * lambda
            + 76.63 * phi * phi
            - 194.56 * lambda * lambda * phi
            + 119.79 * phi.powi(3);

        (easting, northing)
    }

    /// LV03 (easting, northing) to WGS84 degrees.
    pub fn to_lat_lng(easting: f64, northing: f64) -> Result<(f64, f64), ProjectionError> {
        let target = approximate_inverse(easting, northing);
        let mut estimate = target;

        for _ in 0..INVERSE_MAX_ITERATIONS {
            let (e, n) = Self::to_grid(estimate.0, estimate.1);
            let reprojected = approximate_inverse(e, n);

            let d_lat = target.0 - reprojected.0;
            let d_lng = target.1 - reprojected.1;
            estimate = (estimate.0 + d_lat, estimate.1 + d_lng);

            if d_lat.abs() < INVERSE_TOLERANCE && d_lng.abs() < INVERSE_TOLERANCE {
                return Ok(estimate);
            }
        }

        Err(ProjectionError::NoConvergence {
            stage: "swiss grid inverse",
            iterations: INVERSE_MAX_ITERATIONS,
        })
    }
}

impl Default for SwissProjection {
    fn default() -> Self {
        Self::new()
    }
}

fn approximate_inverse(easting: f64, northing: f64) -> (f64, f64) {
    let y = (easting - 600_000.0) / 1_000_000.0;
    let x = (northing - 200_000.0) / 1_000_000.0;

    let lambda = 2.677_909_4 + 4.728_982 * y + 0.791_484 * y * x + 0.1306 * y * x * x
        - 0.0436 * y.powi(3);
    let phi = 16.902_389_2 + 3.238_272 * x
        - 0.270_978 * y * y
        - 0.002_528 * x * x
        - 0.0447 * y * y * x
        - 0.0140 * x.powi(3);

    (phi * 100.0 / 36.0, lambda * 100.0 / 36.0)
}

impl Projection for SwissProjection {
    fn name(&self) -> &'static str {
        "swiss"
    }

    fn bounds(&self) -> GeoRect {
        GeoRect::from_ltrb(5.9, 47.9, 10.6, 45.8)
    }

    fn tile_size(&self) -> PixelSize {
        PixelSize::new(DEFAULT_TILE_SIZE, DEFAULT_TILE_SIZE)
    }

    fn max_zoom(&self) -> u8 {
        (RESOLUTIONS.len() - 1) as u8
    }

    fn from_lat_lng_to_pixel(&self, lat: f64, lng: f64, zoom: u8) -> PixelPoint {
        let (lat, lng) = clip_to_bounds(lat, lng, &self.bounds());
        let (easting, northing) = Self::to_grid(lat, lng);
        let res = Self::resolution(zoom);

        PixelPoint::new(
            ((easting - ORIGIN_X) / res).floor() as i64,
            ((ORIGIN_Y - northing) / res).floor() as i64,
        )
    }

    fn from_pixel_to_lat_lng(
        &self,
        x: i64,
        y: i64,
        zoom: u8,
    ) -> Result<GeoPoint, ProjectionError> {
        let res = Self::resolution(zoom);
        let easting = ORIGIN_X + x as f64 * res;
        let northing = ORIGIN_Y - y as f64 * res;

        let (lat, lng) = Self::to_lat_lng(easting, northing)?;
        Ok(GeoPoint::new(lat, lng))
    }

    fn tile_matrix_min_xy(&self, zoom: u8) -> PixelPoint {
        self.extent(zoom).min
    }

    fn tile_matrix_max_xy(&self, zoom: u8) -> PixelPoint {
        self.extent(zoom).max
    }

    fn ground_resolution(&self, zoom: u8, _latitude: f64) -> f64 {
        Self::resolution(zoom)
    }
}
