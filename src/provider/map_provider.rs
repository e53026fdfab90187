//! The map provider capability.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::TileError;
use crate::projection::Projection;
use crate::tile::TileIndex;

/// Stable numeric identifier of a map provider.
///
/// Part of every [`TileIndex`] and of the persistent cache key, so it must not
/// change between releases for the same provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(pub u32);

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ProviderId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A source of map tiles.
///
/// Routing, geocoding and other vendor services are not part of this trait;
/// providers that offer them expose those through their own types.
#[async_trait]
pub trait MapProvider: Send + Sync {
    /// Identifier used in tile indices and cache keys.
    fn id(&self) -> ProviderId;

    /// Human-readable name.
    fn name(&self) -> &str;

    /// Projection the provider's tiles are cut in.
    fn projection(&self) -> Arc<dyn Projection>;

    /// Providers whose tiles are drawn on top of this one, bottom first.
    fn overlays(&self) -> &[ProviderId] {
        &[]
    }

    /// Fetch the encoded image for `index`.
    ///
    /// `index.provider` is this provider's id.
    async fn get_tile_image(&self, index: &TileIndex) -> Result<Bytes, TileError>;
}
