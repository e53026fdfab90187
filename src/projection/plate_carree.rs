//! Equirectangular projection (EPSG:4326).

use crate::error::ProjectionError;
use crate::geo::{GeoPoint, GeoRect, PixelPoint, PixelSize};

use super::{clip, clip_to_bounds, Projection, MAX_GLOBAL_ZOOM, MERCATOR_MAX_LATITUDE};

const TILE_SIZE: i64 = 512;

/// Plate Carrée with a 2:1 tile matrix: two tiles across and one down at
/// zoom 0, each 512 px square.
#[derive(Debug, Clone)]
pub struct PlateCarreeProjection {
    max_zoom: u8,
}

impl PlateCarreeProjection {
    pub fn new() -> Self {
        Self {
            max_zoom: MAX_GLOBAL_ZOOM,
        }
    }

    /// Degrees per pixel at `zoom`, identical on both axes.
    fn scale(&self, zoom: u8) -> f64 {
        360.0 / self.tile_matrix_size_pixel(zoom).width as f64
    }
}

impl Default for PlateCarreeProjection {
    fn default() -> Self {
        Self::new()
    }
}

impl Projection for PlateCarreeProjection {
    fn name(&self) -> &'static str {
        "plate-carree"
    }

    fn bounds(&self) -> GeoRect {
        GeoRect::from_ltrb(
            -180.0,
            MERCATOR_MAX_LATITUDE,
            180.0,
            -MERCATOR_MAX_LATITUDE,
        )
    }

    fn tile_size(&self) -> PixelSize {
        PixelSize::new(TILE_SIZE, TILE_SIZE)
    }

    fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    fn from_lat_lng_to_pixel(&self, lat: f64, lng: f64, zoom: u8) -> PixelPoint {
        let (lat, lng) = clip_to_bounds(lat, lng, &self.bounds());
        let zoom = zoom.min(self.max_zoom);
        let map = self.tile_matrix_size_pixel(zoom);
        let scale = self.scale(zoom);

        let x = (lng + 180.0) / scale;
        let y = (90.0 - lat) / scale;

        PixelPoint::new(
            clip(x, 0.0, (map.width - 1) as f64) as i64,
            clip(y, 0.0, (map.height - 1) as f64) as i64,
        )
    }

    fn from_pixel_to_lat_lng(
        &self,
        x: i64,
        y: i64,
        zoom: u8,
    ) -> Result<GeoPoint, ProjectionError> {
        let zoom = zoom.min(self.max_zoom);
        let map = self.tile_matrix_size_pixel(zoom);
        let scale = self.scale(zoom);

        let x = clip(x as f64, 0.0, (map.width - 1) as f64);
        let y = clip(y as f64, 0.0, (map.height - 1) as f64);

        Ok(GeoPoint::new(90.0 - y * scale, x * scale - 180.0))
    }

    fn tile_matrix_min_xy(&self, _zoom: u8) -> PixelPoint {
        PixelPoint::new(0, 0)
    }

    fn tile_matrix_max_xy(&self, zoom: u8) -> PixelPoint {
        let zoom = zoom.min(self.max_zoom);
        PixelPoint::new((2_i64 << zoom) - 1, (1_i64 << zoom) - 1)
    }
}
