//! Tile addressing, caching and tier orchestration.
//!
//! # Architecture
//!
//! The tile service sits between map rendering code and the external tile
//! stores:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │       Map control / CLI / caller        │
//! └────────────────────┬────────────────────┘
//!                      │ TileIndex
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              Tile Service               │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │ MemoryCache  │  │ PersistentCache │  │
//! │  │ (FIFO, MB    │  │ (external, with │  │
//! │  │  budget)     │  │  timestamps)    │  │
//! │  └──────────────┘  └─────────────────┘  │
//! └────────────────────┬────────────────────┘
//!                      │ miss
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │     TileSource (ProviderRegistry)       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`TileIndex`]: Provider, zoom and tile column/row of one tile
//! - [`MemoryCache`]: Byte-budgeted in-memory cache with insertion-order eviction
//! - [`TileSource`]: Async contract for fetching a tile on a cache miss
//! - [`PersistentCache`]: Async contract for the durable cache tier
//! - [`TileService`]: Resolves tiles through the tiers per [`CacheMode`]
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use tilekit::provider::ProviderId;
//! use tilekit::tile::{MemoryCache, TileIndex};
//!
//! // Create a cache with 50 MB capacity
//! let cache = MemoryCache::with_capacity_mb(50.0);
//! let index = TileIndex::new(ProviderId(1), 10, 583, 325);
//!
//! if let Some(cached) = cache.try_get(&index) {
//!     println!("Cache hit: {} bytes", cached.len());
//! } else {
//!     let tile_data = Bytes::from(vec![0x89, b'P', b'N', b'G']);
//!     cache.put(index, tile_data);
//! }
//! ```

mod cache;
mod index;
mod service;
mod store;

pub use cache::{CacheStats, MemoryCache, DEFAULT_MEMORY_CACHE_CAPACITY_MB};
pub use index::TileIndex;
pub use service::{CacheMode, TileOrigin, TileResponse, TileService};
pub use store::{PersistentCache, TileSource};
