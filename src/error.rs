use thiserror::Error;

use crate::provider::ProviderId;
use crate::tile::TileIndex;

/// Errors raised by projection inverse transforms.
///
/// Forward transforms never fail: out-of-range coordinates are clamped into
/// the projection's bounds. Inverse transforms of ellipsoidal projections run
/// iterative solvers and report a failure instead of returning a degraded point.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    /// An iterative solver did not reach its tolerance within its iteration cap
    #[error("{stage} failed to converge after {iterations} iterations")]
    NoConvergence {
        stage: &'static str,
        iterations: usize,
    },
}

/// Errors from the persistent tile store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Backend failure (database, filesystem, ...)
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Errors that can occur while resolving a tile image.
#[derive(Debug, Clone, Error)]
pub enum TileError {
    /// The tile source (HTTP fetch, provider) failed
    #[error("Tile source error: {0}")]
    Source(String),

    /// Persistent store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// No provider registered under this identifier
    #[error("Unknown provider: {0}")]
    UnknownProvider(ProviderId),

    /// Cache-only mode and the tile is in neither cache tier
    #[error("Tile {0} is not cached")]
    NotCached(TileIndex),

    /// The source returned an empty image
    #[error("Tile {0} returned no data")]
    EmptyTile(TileIndex),
}
