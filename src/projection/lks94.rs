//! Lithuanian LKS-94 grid (EPSG:3346).

use crate::error::ProjectionError;
use crate::geo::{GeoPoint, GeoRect, PixelPoint, PixelSize};

use super::extents::{corner_extent, ExtentTable, TileExtent};
use super::transverse::{TransverseGrid, TransverseMercator};
use super::{clip_to_bounds, Projection, DEFAULT_TILE_SIZE, GRS80};

const CENTRAL_MERIDIAN: f64 = 24.0;
const SCALE_FACTOR: f64 = 0.9998;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING: f64 = 0.0;

/// Tile grid origin in projected meters.
const ORIGIN_X: f64 = -5_122_000.0;
const ORIGIN_Y: f64 = 10_000_100.0;

/// Meters per pixel for each zoom level.
const RESOLUTIONS: [f64; 13] = [
    1587.50317500635,
    793.751587503175,
    529.167725002117,
    264.583862501058,
    132.291931250529,
    52.9166666666667,
    26.4583333333333,
    13.2291666666667,
    6.61458333333333,
    3.96875,
    2.64583333333333,
    1.32291666666667,
    0.529166666666667,
];

/// LKS-94 / Lithuania TM on GRS80.
#[derive(Debug)]
pub struct Lks94Projection {
    grid: TransverseGrid,
    extents: ExtentTable,
}

impl Lks94Projection {
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

impl Default for Lks94Projection {
    fn default() -> Self {
        Self::new()
    }
}

impl Projection for Lks94Projection {
    fn name(&self) -> &'static str {
        "lks94"
    }

    fn bounds(&self) -> GeoRect {
        GeoRect::from_ltrb(21.0, 56.45, 26.9, 53.7)
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
