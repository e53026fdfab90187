//! Contracts for the tiers behind the memory cache.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::error::{StoreError, TileError};
use crate::provider::ProviderId;

use super::TileIndex;

/// Something that can produce a tile image on a cache miss, typically an HTTP
/// fetch against the provider's tile server.
#[async_trait]
pub trait TileSource: Send + Sync {
    /// Fetch the encoded image for `index`.
    async fn fetch_tile(&self, index: &TileIndex) -> Result<Bytes, TileError>;
}

/// Durable tile store consulted after the memory cache (SQL database, files
/// on disk, ...).
///
/// Implementations must be safe to call from many tasks at once.
#[async_trait]
pub trait PersistentCache: Send + Sync {
    /// Stored bytes for `index`, or `None` if absent.
    async fn get(&self, index: &TileIndex) -> Result<Option<Bytes>, StoreError>;

    /// Store `data` under `index`, stamped with the current time.
    async fn put(&self, index: &TileIndex, data: Bytes) -> Result<(), StoreError>;

    /// Delete tiles stored before `before`, optionally only those of one
    /// provider. Returns the number of tiles removed.
    async fn delete_older_than(
        &self,
        before: DateTime<Utc>,
        provider: Option<ProviderId>,
    ) -> Result<usize, StoreError>;
}
