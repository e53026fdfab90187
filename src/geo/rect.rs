//! Geographic rectangle.

use serde::{Deserialize, Serialize};

use super::point::{GeoPoint, GeoSize};

/// A lat/lng aligned rectangle anchored at its top-left (north-west) corner.
///
/// `lat` is the top edge, `lng` the left edge. The rectangle extends
/// `width_lng` degrees east and `height_lat` degrees south of that corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoRect {
    pub lat: f64,
    pub lng: f64,
    pub width_lng: f64,
    pub height_lat: f64,
}

impl GeoRect {
    /// Create a rectangle from its top-left corner and size.
    pub fn new(top_left: GeoPoint, size: GeoSize) -> Self {
        Self {
            lat: top_left.lat,
            lng: top_left.lng,
            width_lng: size.width_lng,
            height_lat: size.height_lat,
        }
    }

    /// Create a rectangle from its left, top, right and bottom edges.
    pub fn from_ltrb(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            lat: top,
            lng: left,
            width_lng: right - left,
            height_lat: top - bottom,
        }
    }

    pub fn top(&self) -> f64 {
        self.lat
    }

    pub fn left(&self) -> f64 {
        self.lng
    }

    pub fn bottom(&self) -> f64 {
        self.lat - self.height_lat
    }

    pub fn right(&self) -> f64 {
        self.lng + self.width_lng
    }

    pub fn top_left(&self) -> GeoPoint {
        GeoPoint::new(self.top(), self.left())
    }

    pub fn bottom_right(&self) -> GeoPoint {
        GeoPoint::new(self.bottom(), self.right())
    }

    pub fn size(&self) -> GeoSize {
        GeoSize::new(self.width_lng, self.height_lat)
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            self.lat - self.height_lat / 2.0,
            self.lng + self.width_lng / 2.0,
        )
    }

    /// Whether the rectangle has no area.
    pub fn is_empty(&self) -> bool {
        self.width_lng <= 0.0 || self.height_lat <= 0.0
    }

    /// Whether the point lies inside the rectangle (edges included).
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lng >= self.left()
            && point.lng <= self.right()
            && point.lat <= self.top()
            && point.lat >= self.bottom()
    }

    /// Whether this rectangle and `other` overlap.
    pub fn intersects_with(&self, other: &GeoRect) -> bool {
        other.left() < self.right()
            && self.left() < other.right()
            && other.top() > self.bottom()
            && self.top() > other.bottom()
    }

    /// Smallest rectangle containing both rectangles.
    pub fn union(&self, other: &GeoRect) -> GeoRect {
        GeoRect::from_ltrb(
            self.left().min(other.left()),
            self.top().max(other.top()),
            self.right().max(other.right()),
            self.bottom().min(other.bottom()),
        )
    }
}

impl std::fmt::Display for GeoRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{Lat={}, Lng={}, WidthLng={}, HeightLat={}}}",
            self.lat, self.lng, self.width_lng, self.height_lat
        )
    }
}
