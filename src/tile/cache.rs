//! In-memory tile cache with byte-budgeted eviction.
//!
//! The cache holds encoded tile images keyed by [`TileIndex`] and tracks the
//! total byte size of everything it holds. Capacity is configured in
//! megabytes.
//!
//! # Eviction Order
//!
//! Entries are evicted in insertion order, oldest first. Reads never refresh an
//! entry's position, so this is FIFO rather than true LRU. The backing
//! [`LruCache`] is only ever accessed through `peek`/`contains`, which leaves
//! its recency list equal to the insertion order.
//!
//! # Concurrency
//!
//! A single `parking_lot::RwLock` guards the entries, the accounted size and
//! the capacity together. Any number of [`MemoryCache::try_get`] calls proceed
//! in parallel; [`MemoryCache::put`], [`MemoryCache::clear`] and eviction take
//! the write lock for the duration of the structural change only.

use bytes::Bytes;
use lru::LruCache;
use parking_lot::RwLock;
use tracing::debug;

use super::TileIndex;

/// Default memory cache capacity in megabytes.
pub const DEFAULT_MEMORY_CACHE_CAPACITY_MB: f64 = 22.0;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

// =============================================================================
// Entries and Stats
// =============================================================================

#[derive(Debug)]
struct CacheEntry {
    data: Bytes,

    /// Position in insertion order, unique per cache lifetime
    seq: u64,
}

/// Point-in-time snapshot of cache counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheStats {
    /// Number of cached tiles
    pub entries: usize,

    /// Sum of the cached tiles' byte lengths
    pub size_bytes: usize,

    /// Configured capacity in megabytes
    pub capacity_mb: f64,

    /// Total number of entries evicted since creation
    pub evictions: u64,
}

struct Inner {
    entries: LruCache<TileIndex, CacheEntry>,
    size_bytes: usize,
    next_seq: u64,
    capacity_mb: f64,
    evictions: u64,
}

impl Inner {
    /// Drop the oldest entries until the accounted size fits the capacity.
    ///
    /// Returns the number of entries removed.
    fn evict_to_capacity(&mut self) -> usize {
        let limit = self.capacity_mb * BYTES_PER_MB;
        let mut evicted = 0;

        while self.size_bytes as f64 > limit {
            match self.entries.pop_lru() {
                Some((_, entry)) => {
                    self.size_bytes -= entry.data.len();
                    evicted += 1;
                }
                None => break,
            }
        }

        self.evictions += evicted as u64;
        evicted
    }
}

fn sanitize_capacity(capacity_mb: f64) -> f64 {
    if capacity_mb.is_nan() {
        0.0
    } else {
        capacity_mb
    }
}

// =============================================================================
// Memory Cache
// =============================================================================

/// Bounded, process-local store of encoded tile images.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use tilekit::provider::ProviderId;
/// use tilekit::tile::{MemoryCache, TileIndex};
///
/// let cache = MemoryCache::with_capacity_mb(1.0);
/// let index = TileIndex::new(ProviderId(1), 3, 4, 2);
///
/// assert!(cache.put(index, Bytes::from_static(b"\x89PNG")));
/// assert_eq!(cache.try_get(&index), Some(Bytes::from_static(b"\x89PNG")));
///
/// // First writer wins
/// assert!(!cache.put(index, Bytes::from_static(b"other")));
/// ```
pub struct MemoryCache {
    inner: RwLock<Inner>,
}

impl MemoryCache {
    /// Create a cache with the default capacity (22 MB).
    pub fn new() -> Self {
        Self::with_capacity_mb(DEFAULT_MEMORY_CACHE_CAPACITY_MB)
    }

    /// Create a cache holding at most `capacity_mb` megabytes.
    ///
    /// A capacity of zero or less disables the cache: every insert is evicted
    /// straight away.
    pub fn with_capacity_mb(capacity_mb: f64) -> Self {
        Self {
            inner: RwLock::new(Inner {
                entries: LruCache::unbounded(),
                size_bytes: 0,
                next_seq: 0,
                capacity_mb: sanitize_capacity(capacity_mb),
                evictions: 0,
            }),
        }
    }

    /// Cached bytes for `index`, if present.
    ///
    /// Does not affect eviction order. The returned [`Bytes`] is a shared
    /// immutable view of the cached buffer.
    pub fn try_get(&self, index: &TileIndex) -> Option<Bytes> {
        let inner = self.inner.read();
        inner.entries.peek(index).map(|entry| entry.data.clone())
    }

    /// Insert `data` under `index`.
    ///
    /// Returns `false` without storing anything if `data` is empty or `index`
    /// is already cached. Eviction runs before this returns when the insert
    /// pushes the cache over capacity.
    pub fn put(&self, index: TileIndex, data: Bytes) -> bool {
        if data.is_empty() {
            #[cfg(debug_assertions)]
            debug!(tile = %index, "Ignoring empty tile data");
            return false;
        }

        let mut inner = self.inner.write();
        if inner.entries.contains(&index) {
            return false;
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.size_bytes += data.len();
        inner.entries.put(index, CacheEntry { data, seq });

        let evicted = inner.evict_to_capacity();
        if evicted > 0 {
            debug!(
                evicted = evicted,
                size_bytes = inner.size_bytes,
                capacity_mb = inner.capacity_mb,
                "Evicted tiles from memory cache"
            );
        }

        true
    }

    /// Remove every entry.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.entries.clear();
        inner.size_bytes = 0;
    }

    /// Configured capacity in megabytes.
    pub fn capacity(&self) -> f64 {
        self.inner.read().capacity_mb
    }

    /// Change the capacity.
    ///
    /// Nothing is evicted here; the next [`MemoryCache::put`] that finds the
    /// cache over the new limit does it.
    pub fn set_capacity(&self, capacity_mb: f64) {
        self.inner.write().capacity_mb = sanitize_capacity(capacity_mb);
    }

    /// Current footprint in megabytes.
    pub fn size(&self) -> f64 {
        self.size_bytes() as f64 / BYTES_PER_MB
    }

    /// Current footprint in bytes.
    pub fn size_bytes(&self) -> usize {
        self.inner.read().size_bytes
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    pub fn contains(&self, index: &TileIndex) -> bool {
        self.inner.read().entries.contains(index)
    }

    /// The entry that would be evicted next.
    pub fn oldest(&self) -> Option<TileIndex> {
        let inner = self.inner.read();
        inner.entries.peek_lru().map(|(index, _)| *index)
    }

    /// Insertion sequence number of a cached entry.
    pub fn insertion_seq(&self, index: &TileIndex) -> Option<u64> {
        let inner = self.inner.read();
        inner.entries.peek(index).map(|entry| entry.seq)
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.read();
        CacheStats {
            entries: inner.entries.len(),
            size_bytes: inner.size_bytes,
            capacity_mb: inner.capacity_mb,
            evictions: inner.evictions,
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("stats", &self.stats())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
