//! Point and size value types.

use serde::{Deserialize, Serialize};

// =============================================================================
// Geographic Point
// =============================================================================

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees (positive north)
    pub lat: f64,

    /// Longitude in degrees (positive east)
    pub lng: f64,
}

impl GeoPoint {
    /// The origin, used as a "no position" marker.
    pub const EMPTY: GeoPoint = GeoPoint::new(0.0, 0.0);

    /// Create a new point.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_empty(&self) -> bool {
        self.lat == 0.0 && self.lng == 0.0
    }

    /// Return this point shifted by the given deltas.
    pub fn offset(self, d_lat: f64, d_lng: f64) -> Self {
        Self::new(self.lat + d_lat, self.lng + d_lng)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{Lat={}, Lng={}}}", self.lat, self.lng)
    }
}

// =============================================================================
// Pixel Point
// =============================================================================

/// A point in a zoom level's pixel (or tile) coordinate space.
///
/// The same type is used for tile indices, where `x`/`y` are tile columns and
/// rows instead of pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i64,
    pub y: i64,
}

impl PixelPoint {
    /// Create a new pixel point.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Return this point shifted by the given deltas.
    pub fn offset(self, dx: i64, dy: i64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl std::fmt::Display for PixelPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{X={}, Y={}}}", self.x, self.y)
    }
}

// =============================================================================
// Sizes
// =============================================================================

/// Extent of a geographic area in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoSize {
    pub width_lng: f64,
    pub height_lat: f64,
}

impl GeoSize {
    pub const fn new(width_lng: f64, height_lat: f64) -> Self {
        Self {
            width_lng,
            height_lat,
        }
    }
}

/// Extent in pixels (or tiles).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: i64,
    pub height: i64,
}

impl PixelSize {
    pub const fn new(width: i64, height: i64) -> Self {
        Self { width, height }
    }

    /// Whether either dimension is zero or negative.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}
