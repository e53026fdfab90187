//! Lazily built per-zoom tile matrix extents for regional grids.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::geo::{GeoPoint, PixelPoint};

use super::Projection;

/// Inclusive tile index bounds at one zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileExtent {
    pub min: PixelPoint,
    pub max: PixelPoint,
}

/// One slot per zoom level, each filled on first use and immutable afterwards.
///
/// Concurrent first use of the same zoom runs the initializer once; the other
/// callers block until the value is published.
#[derive(Debug)]
pub(crate) struct ExtentTable {
    levels: Box<[OnceLock<TileExtent>]>,
}

impl ExtentTable {
    pub(crate) fn new(levels: usize) -> Self {
        Self {
            levels: (0..levels).map(|_| OnceLock::new()).collect(),
        }
    }

    /// Extent for `zoom`, computing it with `build` the first time.
    ///
    /// `zoom` must be below the number of levels the table was created with;
    /// callers clamp it to their resolution table beforehand.
    pub(crate) fn get_or_build(
        &self,
        zoom: usize,
        build: impl FnOnce() -> TileExtent,
    ) -> TileExtent {
        *self.levels[zoom].get_or_init(build)
    }

    #[cfg(test)]
    pub(crate) fn built_count(&self) -> usize {
        self.levels.iter().filter(|l| l.get().is_some()).count()
    }
}

/// Tile extent spanned by the four corners of a projection's bounds.
pub(crate) fn corner_extent(projection: &dyn Projection, zoom: u8) -> TileExtent {
    let bounds = projection.bounds();
    let corners = [
        bounds.top_left(),
        GeoPoint::new(bounds.top(), bounds.right()),
        bounds.bottom_right(),
        GeoPoint::new(bounds.bottom(), bounds.left()),
    ];

    let tiles = corners.map(|corner| {
        projection.from_pixel_to_tile_xy(projection.from_lat_lng_to_pixel_point(corner, zoom))
    });

    let mut min = tiles[0];
    let mut max = tiles[0];
    for tile in &tiles[1..] {
        min = PixelPoint::new(min.x.min(tile.x), min.y.min(tile.y));
        max = PixelPoint::new(max.x.max(tile.x), max.y.max(tile.y));
    }

    TileExtent { min, max }
}
