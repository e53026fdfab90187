//! Swedish SWEREF 99 TM grid (EPSG:3006).

use crate::error::ProjectionError;
use crate::geo::{GeoPoint, GeoRect, PixelPoint, PixelSize};

use super::extents::{corner_extent, ExtentTable, TileExtent};
use super::transverse::{TransverseGrid, TransverseMercator};
use super::{clip_to_bounds, Projection, DEFAULT_TILE_SIZE, GRS80};

const CENTRAL_MERIDIAN: f64 = 15.0;
const SCALE_FACTOR: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING: f64 = 0.0;

const ORIGIN_X: f64 = -1_200_000.0;
const ORIGIN_Y: f64 = 8_500_000.0;

const RESOLUTIONS: [f64; 14] = [
    4096.0, 2048.0, 1024.0, 512.0, 256.0, 128.0, 64.0, 32.0, 16.0, 8.0, 4.0, 2.0, 1.0, 0.5,
];

/// SWEREF 99 TM on GRS80.
#[derive(Debug)]
pub struct Sweref99Projection {
    grid: TransverseGrid,
    extents: ExtentTable,
}

impl Sweref99Projection {
    pub fn new() -> Self {
        Self {
            grid: TransverseGrid {
                tm: TransverseMercator::new(
                    GRS80,
                    CENTRAL_MERIDIAN,
                    SCALE_FACTOR,
                    FALSE_EASTING,
                    FALSE_NORTHING,
                ),
                origin_x: ORIGIN_X,
                origin_y: ORIGIN_Y,
                resolutions: &RESOLUTIONS,
            },
            extents: ExtentTable::new(RESOLUTIONS.len()),
        }
    }

    fn extent(&self, zoom: u8) -> TileExtent {
        let zoom = zoom.min(self.max_zoom());
        self.extents
            .get_or_build(usize::from(zoom), || corner_extent(self, zoom))
    }
}

impl Default for Sweref99Projection {
    fn default() -> Self {
        Self::new()
    }
}

impl Projection for Sweref99Projection {
    fn name(&self) -> &'static str {
        "sweref99"
    }

    fn bounds(&self) -> GeoRect {
        GeoRect::from_ltrb(10.03, 69.1, 24.17, 55.2)
    }

    fn tile_size(&self) -> PixelSize {
        PixelSize::new(DEFAULT_TILE_SIZE, DEFAULT_TILE_SIZE)
    }

    fn axis(&self) -> f64 {
        GRS80.a
    }

    fn flattening(&self) -> f64 {
        GRS80.f
    }

    fn max_zoom(&self) -> u8 {
        self.grid.max_zoom()
    }

    fn from_lat_lng_to_pixel(&self, lat: f64, lng: f64, zoom: u8) -> PixelPoint {
        let (lat, lng) = clip_to_bounds(lat, lng, &self.bounds());
        self.grid.to_pixel(lat, lng, zoom)
    }

    fn from_pixel_to_lat_lng(
        &self,
        x: i64,
        y: i64,
        zoom: u8,
    ) -> Result<GeoPoint, ProjectionError> {
        self.grid.to_lat_lng(x, y, zoom)
    }

    fn tile_matrix_min_xy(&self, zoom: u8) -> PixelPoint {
        self.extent(zoom).min
    }

    fn tile_matrix_max_xy(&self, zoom: u8) -> PixelPoint {
        self.extent(zoom).max
    }

    fn ground_resolution(&self, zoom: u8, _latitude: f64) -> f64 {
        self.grid.resolution(zoom)
    }
}
