//! Tile service integration tests.
//!
//! Tests verify:
//! - Tier resolution order and write-back for each cache mode
//! - Degradation when the persistent cache fails
//! - Expiry of persistent entries
//! - Serving real providers through the provider registry

use std::sync::atomic::Ordering;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{Duration, Utc};

use tilekit::error::TileError;
use tilekit::projection::ProjectionKind;
use tilekit::provider::{ProviderId, ProviderRegistry};
use tilekit::tile::{CacheMode, TileOrigin, TileService};

use super::test_utils::{
    make_index, make_tile_bytes, InMemoryPersistentCache, MockProvider, MockTileSource,
};

fn service_with_store(
    mode: CacheMode,
) -> (
    TileService<MockTileSource>,
    Arc<MockTileSource>,
    Arc<InMemoryPersistentCache>,
) {
    let source = Arc::new(MockTileSource::new());
    let store = Arc::new(InMemoryPersistentCache::new());
    let service = TileService::with_shared_source(Arc::clone(&source))
        .with_persistent_cache(store.clone())
        .with_mode(mode);
    (service, source, store)
}

// =============================================================================
// Server And Cache
// =============================================================================

#[tokio::test]
async fn test_miss_fetches_and_fills_both_tiers() {
    let (service, source, store) = service_with_store(CacheMode::ServerAndCache);
    let index = make_index(1, 10, 583, 325);

    let response = service.get_tile(index).await.unwrap();

    assert_eq!(response.origin, TileOrigin::Source);
    assert!(!response.cache_hit());
    assert_eq!(response.data, make_tile_bytes(&index));
    assert_eq!(source.request_count(), 1);
    assert!(store.contains(&index));
    assert!(service.memory_cache().contains(&index));
}

#[tokio::test]
async fn test_tier_order_memory_then_persistent() {
    let (service, source, store) = service_with_store(CacheMode::ServerAndCache);
    let index = make_index(1, 10, 583, 325);

    service.get_tile(index).await.unwrap();
    let gets_after_fetch = store.get_count();

    // Memory hit does not touch the persistent tier
    let response = service.get_tile(index).await.unwrap();
    assert_eq!(response.origin, TileOrigin::Memory);
    assert_eq!(store.get_count(), gets_after_fetch);

    // With memory cleared the persistent tier answers
    service.clear_memory_cache();
    let response = service.get_tile(index).await.unwrap();
    assert_eq!(response.origin, TileOrigin::Persistent);
    assert!(response.cache_hit());

    assert_eq!(source.request_count(), 1);
}

#[tokio::test]
async fn test_persistent_hit_is_promoted_to_memory() {
    let (service, source, store) = service_with_store(CacheMode::ServerAndCache);
    let index = make_index(2, 7, 70, 40);
    store.insert_aged(index, Bytes::from_static(b"stored"), Duration::hours(1));

    let first = service.get_tile(index).await.unwrap();
    let second = service.get_tile(index).await.unwrap();

    assert_eq!(first.origin, TileOrigin::Persistent);
    assert_eq!(second.origin, TileOrigin::Memory);
    assert_eq!(second.data, Bytes::from_static(b"stored"));
    assert_eq!(store.get_count(), 1);
    assert_eq!(source.request_count(), 0);
}

#[tokio::test]
async fn test_broken_persistent_cache_falls_back_to_source() {
    let (service, source, store) = service_with_store(CacheMode::ServerAndCache);
    store.set_broken(true);
    let index = make_index(1, 3, 2, 5);

    let response = service.get_tile(index).await.unwrap();

    assert_eq!(response.origin, TileOrigin::Source);
    assert_eq!(source.request_count(), 1);
    assert_eq!(store.put_count(), 1);
    assert!(!store.contains(&index));

    // The memory tier still holds the tile
    let again = service.get_tile(index).await.unwrap();
    assert_eq!(again.origin, TileOrigin::Memory);
}

// =============================================================================
// Server Only
// =============================================================================

#[tokio::test]
async fn test_server_only_skips_persistent_tier() {
    let (service, source, store) = service_with_store(CacheMode::ServerOnly);
    let index = make_index(1, 5, 17, 9);
    store.insert_aged(index, Bytes::from_static(b"stale"), Duration::days(30));

    let response = service.get_tile(index).await.unwrap();

    assert_eq!(response.origin, TileOrigin::Source);
    assert_eq!(response.data, make_tile_bytes(&index));
    assert_eq!(source.request_count(), 1);
    assert_eq!(store.get_count(), 0);
    assert_eq!(store.put_count(), 0);

    // The memory tier is still used
    let again = service.get_tile(index).await.unwrap();
    assert_eq!(again.origin, TileOrigin::Memory);
    assert_eq!(source.request_count(), 1);
}

// =============================================================================
// Cache Only
// =============================================================================

#[tokio::test]
async fn test_cache_only_miss_is_not_cached_error() {
    let (service, source, _store) = service_with_store(CacheMode::CacheOnly);
    let index = make_index(1, 5, 1, 1);

    let result = service.get_tile(index).await;

    assert!(matches!(result, Err(TileError::NotCached(i)) if i == index));
    assert_eq!(source.request_count(), 0);
}

#[tokio::test]
async fn test_cache_only_serves_persistent_hits() {
    let (service, source, store) = service_with_store(CacheMode::CacheOnly);
    let index = make_index(1, 5, 1, 1);
    store.insert_aged(index, Bytes::from_static(b"offline"), Duration::minutes(5));

    let response = service.get_tile(index).await.unwrap();

    assert_eq!(response.origin, TileOrigin::Persistent);
    assert_eq!(response.data, Bytes::from_static(b"offline"));
    assert_eq!(source.request_count(), 0);
}

#[tokio::test]
async fn test_cache_only_without_store_serves_memory_only() {
    let source = Arc::new(MockTileSource::new());
    let service =
        TileService::with_shared_source(Arc::clone(&source)).with_mode(CacheMode::CacheOnly);
    let index = make_index(4, 2, 0, 0);

    assert!(service.get_tile(index).await.is_err());

    service
        .memory_cache()
        .put(index, Bytes::from_static(b"preloaded"));
    let response = service.get_tile(index).await.unwrap();
    assert_eq!(response.origin, TileOrigin::Memory);
    assert_eq!(source.request_count(), 0);
}

// =============================================================================
// Source Failures
// =============================================================================

#[tokio::test]
async fn test_source_error_is_not_cached() {
    let (service, source, store) = service_with_store(CacheMode::ServerAndCache);
    let index = make_index(1, 9, 100, 200);
    source.fail_on(index);

    let first = service.get_tile(index).await;
    let second = service.get_tile(index).await;

    assert!(matches!(first, Err(TileError::Source(_))));
    assert!(matches!(second, Err(TileError::Source(_))));
    // Failures are retried, not remembered
    assert_eq!(source.request_count(), 2);
    assert!(!store.contains(&index));
    assert!(service.memory_cache().is_empty());
}

#[tokio::test]
async fn test_empty_source_data_is_an_error() {
    let (service, source, store) = service_with_store(CacheMode::ServerAndCache);
    let index = make_index(1, 9, 100, 200);
    source.empty_on(index);

    let result = service.get_tile(index).await;

    assert!(matches!(result, Err(TileError::EmptyTile(i)) if i == index));
    assert_eq!(store.put_count(), 0);
    assert!(!service.memory_cache().contains(&index));
}

// =============================================================================
// Expiry
// =============================================================================

#[tokio::test]
async fn test_delete_older_than_filters_by_age_and_provider() {
    let (service, _source, store) = service_with_store(CacheMode::ServerAndCache);

    let old_streets = make_index(1, 4, 1, 1);
    let old_satellite = make_index(2, 4, 1, 1);
    let fresh_streets = make_index(1, 4, 2, 2);
    store.insert_aged(old_streets, Bytes::from_static(b"a"), Duration::days(10));
    store.insert_aged(old_satellite, Bytes::from_static(b"b"), Duration::days(10));
    store.insert_aged(fresh_streets, Bytes::from_static(b"c"), Duration::minutes(1));

    let cutoff = Utc::now() - Duration::days(1);

    let removed = service
        .delete_older_than(cutoff, Some(ProviderId(1)))
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert!(!store.contains(&old_streets));
    assert!(store.contains(&old_satellite));
    assert!(store.contains(&fresh_streets));

    let removed = service.delete_older_than(cutoff, None).await.unwrap();
    assert_eq!(removed, 1);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_delete_older_than_reports_store_errors() {
    let (service, _source, store) = service_with_store(CacheMode::ServerAndCache);
    store.set_broken(true);

    let result = service.delete_older_than(Utc::now(), None).await;
    assert!(matches!(result, Err(TileError::Store(_))));
}

#[tokio::test]
async fn test_delete_older_than_without_store_is_noop() {
    let service = TileService::new(MockTileSource::new());
    assert_eq!(service.delete_older_than(Utc::now(), None).await.unwrap(), 0);
}

// =============================================================================
// Provider Registry as Source
// =============================================================================

fn registry() -> (ProviderRegistry, Arc<std::sync::atomic::AtomicUsize>) {
    let streets = MockProvider::new(1, "Streets", ProjectionKind::Mercator);
    let labels = MockProvider::new(2, "Labels", ProjectionKind::Mercator);
    let hybrid = MockProvider::new(3, "Hybrid", ProjectionKind::Mercator).with_overlays(&[1, 2]);
    let swiss = MockProvider::new(4, "SwissTopo", ProjectionKind::Swiss);
    let counter = streets.request_counter();

    let registry = ProviderRegistry::builder()
        .register(streets)
        .register(labels)
        .register(hybrid)
        .register(swiss)
        .build();

    (registry, counter)
}

#[tokio::test]
async fn test_registry_routes_by_provider() {
    let (registry, streets_requests) = registry();
    let service = TileService::new(registry);

    let index = make_index(1, 10, 583, 325);
    let response = service.get_tile(index).await.unwrap();
    assert_eq!(response.data, make_tile_bytes(&index));
    assert_eq!(streets_requests.load(Ordering::SeqCst), 1);

    // Same coordinates, other provider: a separate fetch
    let labels_index = make_index(2, 10, 583, 325);
    service.get_tile(labels_index).await.unwrap();
    assert_eq!(streets_requests.load(Ordering::SeqCst), 1);
    assert_eq!(service.memory_cache().len(), 2);
}

#[tokio::test]
async fn test_registry_unknown_provider() {
    let (registry, _) = registry();
    let service = TileService::new(registry);

    let result = service.get_tile(make_index(99, 1, 0, 0)).await;
    assert!(matches!(result, Err(TileError::UnknownProvider(ProviderId(99)))));
}

#[tokio::test]
async fn test_registry_tile_outside_projection_matrix() {
    let (registry, _) = registry();
    let service = TileService::new(registry);

    // Swiss zoom 0 is a single tile
    assert!(service.get_tile(make_index(4, 0, 0, 0)).await.is_ok());
    assert!(matches!(
        service.get_tile(make_index(4, 0, 5, 5)).await,
        Err(TileError::Source(_))
    ));
}

#[test]
fn test_registry_lookup_and_overlays() {
    let (registry, _) = registry();

    assert_eq!(registry.len(), 4);
    assert_eq!(
        registry.find_by_name("swisstopo").map(|p| p.id()),
        Some(ProviderId(4))
    );
    assert_eq!(
        registry.get(ProviderId(4)).map(|p| p.projection().name()),
        Some("swiss")
    );

    let overlays = registry.overlays_of(ProviderId(3)).unwrap();
    let names: Vec<_> = overlays.iter().map(|p| p.name().to_string()).collect();
    assert_eq!(names, vec!["Streets", "Labels"]);

    assert!(registry.overlays_of(ProviderId(1)).unwrap().is_empty());
    assert!(registry.overlays_of(ProviderId(42)).is_err());
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_tiles_concurrently() {
    let (service, source, store) = service_with_store(CacheMode::ServerAndCache);
    let service = Arc::new(service);

    let handles: Vec<_> = (0..32i64)
        .map(|x| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                let index = make_index(1, 6, x % 8, 0);
                let response = service.get_tile(index).await.unwrap();
                assert_eq!(response.data, make_tile_bytes(&index));
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    // Eight distinct tiles; coalescing keeps the fetch count at or above that,
    // and every tile reaches both tiers.
    assert!(source.request_count() >= 8);
    assert_eq!(store.len(), 8);
    assert_eq!(service.memory_cache().len(), 8);
}
