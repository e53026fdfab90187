//! Map provider capability and registry.
//!
//! A map provider is an external tile service (a vendor's tile server, a WMS
//! endpoint, a local tile folder). This crate only needs one thing from it:
//! "give me the image for this tile", plus the projection its tiles are cut
//! in and the overlay providers drawn on top of it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              Tile Service               │
//! └────────────────────┬────────────────────┘
//!                      │ TileSource::fetch_tile
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │           ProviderRegistry              │
//! │  (built once, shared behind an Arc)     │
//! └────────────────────┬────────────────────┘
//!                      │ ProviderId lookup
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │           MapProvider Trait             │
//! │  id · name · projection · overlays ·    │
//! │  get_tile_image                         │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use tilekit::provider::{MapProvider, ProviderId, ProviderRegistry};
//!
//! let registry = Arc::new(
//!     ProviderRegistry::builder()
//!         .register(OsmProvider::new())
//!         .register(SatelliteProvider::new())
//!         .build(),
//! );
//!
//! let osm = registry.require(ProviderId(1))?;
//! let pixel = osm.projection().from_lat_lng_to_pixel(54.69, 25.28, 12);
//! ```

mod map_provider;
mod registry;

pub use map_provider::{MapProvider, ProviderId};
pub use registry::{ProviderRegistry, ProviderRegistryBuilder};
