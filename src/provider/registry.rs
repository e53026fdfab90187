//! Provider registry.
//!
//! The registry maps [`ProviderId`]s to provider instances. It is assembled
//! once at startup with [`ProviderRegistry::builder`] and is read-only
//! afterwards; components that need lookup receive it (usually in an `Arc`)
//! at construction time.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{trace, warn};

use crate::error::TileError;
use crate::tile::{TileIndex, TileSource};

use super::{MapProvider, ProviderId};

// =============================================================================
// Builder
// =============================================================================

/// Collects providers for a [`ProviderRegistry`].
#[derive(Default)]
pub struct ProviderRegistryBuilder {
    providers: Vec<Arc<dyn MapProvider>>,
}

impl ProviderRegistryBuilder {
    /// Add a provider.
    pub fn register(self, provider: impl MapProvider + 'static) -> Self {
        self.register_shared(Arc::new(provider))
    }

    /// Add a provider that is also held elsewhere.
    pub fn register_shared(mut self, provider: Arc<dyn MapProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Freeze the registry.
    ///
    /// When two providers share an id, the one registered last wins.
    pub fn build(self) -> ProviderRegistry {
        let mut by_id: HashMap<ProviderId, Arc<dyn MapProvider>> = HashMap::new();
        let mut order = Vec::with_capacity(self.providers.len());

        for provider in self.providers {
            let id = provider.id();
            if let Some(previous) = by_id.insert(id, Arc::clone(&provider)) {
                warn!(
                    provider_id = %id,
                    replaced = previous.name(),
                    by = provider.name(),
                    "Duplicate provider id, keeping the last registration"
                );
            } else {
                order.push(id);
            }
        }

        ProviderRegistry { by_id, order }
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Immutable lookup table of map providers.
pub struct ProviderRegistry {
    by_id: HashMap<ProviderId, Arc<dyn MapProvider>>,

    /// Ids in first-registration order
    order: Vec<ProviderId>,
}

impl ProviderRegistry {
    pub fn builder() -> ProviderRegistryBuilder {
        ProviderRegistryBuilder::default()
    }

    pub fn get(&self, id: ProviderId) -> Option<&Arc<dyn MapProvider>> {
        self.by_id.get(&id)
    }

    /// Like [`ProviderRegistry::get`], but a missing id is an error.
    pub fn require(&self, id: ProviderId) -> Result<&Arc<dyn MapProvider>, TileError> {
        self.get(id).ok_or(TileError::UnknownProvider(id))
    }

    /// Look a provider up by its display name (case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<&Arc<dyn MapProvider>> {
        self.iter().find(|p| p.name().eq_ignore_ascii_case(name))
    }

    /// Providers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn MapProvider>> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Resolve the overlay providers of `id`, bottom first.
    ///
    /// Fails if `id` or any of its overlays is not registered.
    pub fn overlays_of(&self, id: ProviderId) -> Result<Vec<Arc<dyn MapProvider>>, TileError> {
        self.require(id)?
            .overlays()
            .iter()
            .map(|overlay| self.require(*overlay).map(Arc::clone))
            .collect()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|p| (p.id(), p.name().to_string())))
            .finish()
    }
}

#[async_trait]
impl TileSource for ProviderRegistry {
    async fn fetch_tile(&self, index: &TileIndex) -> Result<Bytes, TileError> {
        let provider = self.require(index.provider)?;
        trace!(tile = %index, provider = provider.name(), "Fetching tile from provider");
        provider.get_tile_image(index).await
    }
}

// =============================================================================
// Tests
// =============================================================================
