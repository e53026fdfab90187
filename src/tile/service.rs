//! Tile Service for resolving tile images through the cache tiers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          TileService                            │
//! │  ┌─────────────────────────────────────────────────────────┐    │
//! │  │                     get_tile()                          │    │
//! │  │  1. Memory cache      3. Tile source (per CacheMode)    │    │
//! │  │  2. Persistent cache  4. Write back & return            │    │
//! │  └─────────────────────────────────────────────────────────┘    │
//! │           │                    │                    │           │
//! │           ▼                    ▼                    ▼           │
//! │    ┌─────────────┐   ┌─────────────────┐   ┌──────────────┐     │
//! │    │ MemoryCache │   │ PersistentCache │   │  TileSource  │     │
//! │    └─────────────┘   └─────────────────┘   └──────────────┘     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, trace, warn};

use crate::error::TileError;
use crate::provider::ProviderId;

use super::cache::MemoryCache;
use super::store::{PersistentCache, TileSource};
use super::TileIndex;

// =============================================================================
// Cache Mode
// =============================================================================

/// Which tiers [`TileService::get_tile`] may use besides the memory cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheMode {
    /// Always fetch from the source; never read or write the persistent cache
    ServerOnly,

    /// Read the persistent cache first, fetch on miss and store the result
    #[default]
    ServerAndCache,

    /// Never fetch; a miss in both caches is an error
    CacheOnly,
}

impl CacheMode {
    fn uses_persistent(self) -> bool {
        !matches!(self, CacheMode::ServerOnly)
    }

    fn uses_source(self) -> bool {
        !matches!(self, CacheMode::CacheOnly)
    }
}

// =============================================================================
// Tile Response
// =============================================================================

/// Tier a tile was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TileOrigin {
    Memory,
    Persistent,
    Source,
}

/// Response from the tile service.
#[derive(Debug, Clone)]
pub struct TileResponse {
    /// The encoded tile image
    pub data: Bytes,

    /// Where the image came from
    pub origin: TileOrigin,
}

impl TileResponse {
    /// Whether this tile was served from either cache tier.
    pub fn cache_hit(&self) -> bool {
        !matches!(self.origin, TileOrigin::Source)
    }
}

// =============================================================================
// Tile Service
// =============================================================================

/// Service resolving tile images through memory cache, persistent cache and
/// tile source, in that order.
///
/// Results from a lower tier are written back into the tiers above it.
/// Concurrent misses on the same tile share a single source fetch and a single
/// write-back.
///
/// # Type Parameters
///
/// * `S` - The tile source, usually a [`ProviderRegistry`](crate::provider::ProviderRegistry)
///
/// # Example
///
/// ```ignore
/// use tilekit::provider::ProviderRegistry;
/// use tilekit::tile::{CacheMode, TileIndex, TileService};
///
/// let registry = ProviderRegistry::builder().register(my_provider).build();
/// let service = TileService::new(registry)
///     .with_persistent_cache(disk_cache)
///     .with_mode(CacheMode::ServerAndCache);
///
/// let response = service.get_tile(TileIndex::new(my_id, 10, 583, 325)).await?;
/// println!("{} bytes from {:?}", response.data.len(), response.origin);
/// ```
pub struct TileService<S: TileSource> {
    source: Arc<S>,
    persistent: Option<Arc<dyn PersistentCache>>,
    memory: MemoryCache,
    mode: CacheMode,

    /// Source fetches in progress, for singleflight
    in_flight: Mutex<HashMap<TileIndex, InFlight>>,
}

/// Shared outcome of one source fetch.
type InFlight = Arc<OnceCell<Result<Bytes, TileError>>>;

impl<S: TileSource> TileService<S> {
    /// Create a service with a default-sized memory cache and no persistent
    /// tier.
    pub fn new(source: S) -> Self {
        Self::with_shared_source(Arc::new(source))
    }

    /// Create a service around a source shared with other components.
    pub fn with_shared_source(source: Arc<S>) -> Self {
        Self {
            source,
            persistent: None,
            memory: MemoryCache::new(),
            mode: CacheMode::default(),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Attach a persistent cache tier.
    pub fn with_persistent_cache(mut self, cache: Arc<dyn PersistentCache>) -> Self {
        self.persistent = Some(cache);
        self
    }

    /// Replace the memory cache with one of `capacity_mb` megabytes.
    pub fn with_memory_capacity_mb(mut self, capacity_mb: f64) -> Self {
        self.memory = MemoryCache::with_capacity_mb(capacity_mb);
        self
    }

    pub fn with_mode(mut self, mode: CacheMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> CacheMode {
        self.mode
    }

    /// Get a tile, consulting each tier allowed by the cache mode.
    ///
    /// # Errors
    ///
    /// - [`TileError::NotCached`] in [`CacheMode::CacheOnly`] when neither cache
    ///   holds the tile
    /// - [`TileError::EmptyTile`] when the source returns no bytes
    /// - Any error returned by the tile source
    ///
    /// Persistent cache failures are logged and treated as a miss.
    pub async fn get_tile(&self, index: TileIndex) -> Result<TileResponse, TileError> {
        if let Some(data) = self.memory.try_get(&index) {
            trace!(tile = %index, "Memory cache hit");
            return Ok(TileResponse {
                data,
                origin: TileOrigin::Memory,
            });
        }

        if self.mode.uses_persistent() {
            if let Some(data) = self.read_persistent(&index).await {
                debug!(tile = %index, bytes = data.len(), "Persistent cache hit");
                self.memory.put(index, data.clone());
                return Ok(TileResponse {
                    data,
                    origin: TileOrigin::Persistent,
                });
            }
        }

        if !self.mode.uses_source() {
            debug!(tile = %index, "Tile not cached and source access is disabled");
            return Err(TileError::NotCached(index));
        }

        let data = self.fetch_singleflight(&index).await?;
        Ok(TileResponse {
            data,
            origin: TileOrigin::Source,
        })
    }

    /// Fetch `index` from the source and write it back, joining a fetch that
    /// is already running for the same tile.
    async fn fetch_singleflight(&self, index: &TileIndex) -> Result<Bytes, TileError> {
        let state = {
            let mut in_flight = self.in_flight.lock();
            Arc::clone(in_flight.entry(*index).or_default())
        };

        let result = state
            .get_or_init(|| self.fetch_and_store(index))
            .await
            .clone();

        // The first caller to finish retires the entry; later callers find
        // either nothing or a newer fetch they must leave alone.
        {
            let mut in_flight = self.in_flight.lock();
            if in_flight
                .get(index)
                .is_some_and(|current| Arc::ptr_eq(current, &state))
            {
                in_flight.remove(index);
            }
        }

        result
    }

    async fn fetch_and_store(&self, index: &TileIndex) -> Result<Bytes, TileError> {
        let data = self.fetch(index).await?;

        self.memory.put(*index, data.clone());
        if self.mode.uses_persistent() {
            self.write_persistent(index, data.clone()).await;
        }

        Ok(data)
    }

    async fn fetch(&self, index: &TileIndex) -> Result<Bytes, TileError> {
        let data = self.source.fetch_tile(index).await.map_err(|e| {
            warn!(tile = %index, error = %e, "Tile fetch failed");
            e
        })?;

        if data.is_empty() {
            warn!(tile = %index, "Tile source returned no data");
            return Err(TileError::EmptyTile(*index));
        }

        debug!(tile = %index, bytes = data.len(), "Fetched tile from source");
        Ok(data)
    }

    async fn read_persistent(&self, index: &TileIndex) -> Option<Bytes> {
        let store = self.persistent.as_ref()?;
        match store.get(index).await {
            Ok(Some(data)) if !data.is_empty() => Some(data),
            Ok(_) => None,
            Err(e) => {
                warn!(tile = %index, error = %e, "Persistent cache read failed");
                None
            }
        }
    }

    async fn write_persistent(&self, index: &TileIndex, data: Bytes) {
        if let Some(store) = &self.persistent {
            if let Err(e) = store.put(index, data).await {
                warn!(tile = %index, error = %e, "Persistent cache write failed");
            }
        }
    }

    /// Delete persistent cache entries stored before `before`.
    ///
    /// Returns the number of tiles removed, or 0 without a persistent tier.
    pub async fn delete_older_than(
        &self,
        before: DateTime<Utc>,
        provider: Option<ProviderId>,
    ) -> Result<usize, TileError> {
        let Some(store) = &self.persistent else {
            return Ok(0);
        };

        let removed = store.delete_older_than(before, provider).await?;
        debug!(removed = removed, "Purged persistent cache");
        Ok(removed)
    }

    /// Clear the memory cache. The persistent tier is left untouched.
    pub fn clear_memory_cache(&self) {
        self.memory.clear();
    }

    pub fn memory_cache(&self) -> &MemoryCache {
        &self.memory
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }
}

// =============================================================================
// Tests
// =============================================================================
