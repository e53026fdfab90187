//! # tilekit
//!
//! Building blocks for slippy-map clients: cartographic projections that map
//! geographic coordinates onto tile grids, and a tile cache stack that keeps
//! recently used tile images in memory.
//!
//! ## Features
//!
//! - **Projections**: Web Mercator, ellipsoidal Mercator, Plate Carrée and the
//!   Swiss, Lithuanian and Swedish national grids, all behind one trait
//! - **Iterative inverses**: Ellipsoidal inverses report non-convergence instead
//!   of returning a degraded point
//! - **Memory cache**: Megabyte-budgeted, insertion-order eviction, many
//!   concurrent readers
//! - **Tier orchestration**: Memory cache, persistent cache and tile source
//!   resolved per [`CacheMode`]
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`geo`] - Point, size and rectangle value types
//! - [`projection`] - The [`Projection`] trait and concrete projections
//! - [`tile`] - Tile addressing, the memory cache and the tile service
//! - [`provider`] - Map provider capability and registry
//! - [`config`] - CLI configuration types
//!
//! ## Example
//!
//! ```rust
//! use tilekit::{MercatorProjection, PixelPoint, Projection};
//!
//! let mercator = MercatorProjection::new();
//!
//! let pixel = mercator.from_lat_lng_to_pixel(54.6872, 25.2797, 10);
//! let tile = mercator.from_pixel_to_tile_xy(pixel);
//! assert_eq!(tile, PixelPoint::new(583, 325));
//!
//! let back = mercator.from_pixel_to_lat_lng(pixel.x, pixel.y, 10).unwrap();
//! assert!((back.lat - 54.6872).abs() < 0.01);
//! ```

pub mod config;
pub mod error;
pub mod geo;
pub mod projection;
pub mod provider;
pub mod tile;

// Re-export commonly used types
pub use config::{Cli, Command, OutputFormat};
pub use error::{ProjectionError, StoreError, TileError};
pub use geo::{GeoPoint, GeoRect, GeoSize, PixelPoint, PixelSize};
pub use projection::{
    EllipticalMercatorProjection, Lks94Projection, MercatorProjection, PlateCarreeProjection,
    Projection, ProjectionKind, Sweref99Projection, SwissProjection, DEFAULT_TILE_SIZE,
};
pub use provider::{MapProvider, ProviderId, ProviderRegistry};
pub use tile::{
    CacheMode, CacheStats, MemoryCache, PersistentCache, TileIndex, TileOrigin, TileResponse,
    TileService, TileSource, DEFAULT_MEMORY_CACHE_CAPACITY_MB,
};
