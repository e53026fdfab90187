//! Geographic and pixel value types.
//!
//! These are small `Copy` types shared by the projection and tile layers:
//!
//! - [`GeoPoint`]: latitude/longitude in degrees
//! - [`PixelPoint`]: integer pixel or tile coordinates within a zoom level
//! - [`GeoSize`] / [`PixelSize`]: extents
//! - [`GeoRect`]: lat/lng rectangle anchored at its north-west corner

mod point;
mod rect;

pub use point::{GeoPoint, GeoSize, PixelPoint, PixelSize};
pub use rect::GeoRect;
