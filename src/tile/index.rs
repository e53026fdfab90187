//! Tile addressing.

use serde::{Deserialize, Serialize};

use crate::geo::PixelPoint;
use crate::provider::ProviderId;

/// Identity of one raster tile: provider, zoom level and tile column/row.
///
/// Used directly as the memory cache key. Equality and hashing cover all four
/// fields; eviction order is tracked by the cache, not by the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileIndex {
    /// Provider the tile image comes from
    pub provider: ProviderId,

    /// Zoom level
    pub zoom: u8,

    /// Tile column (0-indexed from the left of the tile matrix)
    pub x: i64,

    /// Tile row (0-indexed from the top of the tile matrix)
    pub y: i64,
}

impl TileIndex {
    /// Create a new tile index.
    pub const fn new(provider: ProviderId, zoom: u8, x: i64, y: i64) -> Self {
        Self { provider, zoom, x, y }
    }

    /// Index of the tile at `tile` (as returned by the projection helpers).
    pub const fn from_tile_xy(provider: ProviderId, zoom: u8, tile: PixelPoint) -> Self {
        Self::new(provider, zoom, tile.x, tile.y)
    }

    /// Tile column and row as a [`PixelPoint`].
    pub const fn tile_xy(&self) -> PixelPoint {
        PixelPoint::new(self.x, self.y)
    }
}

impl std::fmt::Display for TileIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}/{}", self.provider, self.zoom, self.x, self.y)
    }
}
