//! Memory cache integration tests.
//!
//! Tests verify:
//! - Accounted size always equals the sum of the held entries
//! - Eviction keeps exactly the most recently inserted entries
//! - Readers running alongside writers only ever see complete entries

use std::collections::VecDeque;
use std::sync::Arc;

use bytes::Bytes;

use tilekit::tile::{MemoryCache, TileIndex};

use super::test_utils::make_index;

const MB: usize = 1024 * 1024;

/// Small deterministic generator so the workload is reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }
}

// =============================================================================
// Accounting and Eviction Order
// =============================================================================

#[test]
fn test_accounting_matches_model_under_mixed_workload() {
    let capacity_mb = 2.0;
    let cache = MemoryCache::with_capacity_mb(capacity_mb);
    let mut rng = Lcg(7);

    // Reference model: insertion-ordered (index, size) pairs
    let mut model: VecDeque<(TileIndex, usize)> = VecDeque::new();

    for step in 0..2_000 {
        let index = make_index(1, 12, (rng.next() % 300) as i64, 0);
        let size = (rng.next() % (MB as u64 / 4)) as usize;

        let inserted = cache.put(index, Bytes::from(vec![1u8; size]));
        let expected_insert = size > 0 && !model.iter().any(|(i, _)| *i == index);
        assert_eq!(inserted, expected_insert, "step {}", step);

        if expected_insert {
            model.push_back((index, size));
            let limit = capacity_mb * MB as f64;
            while model.iter().map(|(_, s)| *s).sum::<usize>() as f64 > limit {
                model.pop_front();
            }
        }

        let expected_size: usize = model.iter().map(|(_, s)| *s).sum();
        assert_eq!(cache.size_bytes(), expected_size, "step {}", step);
        assert_eq!(cache.len(), model.len(), "step {}", step);
        assert!(cache.size() <= capacity_mb);
        assert_eq!(cache.oldest(), model.front().map(|(i, _)| *i));
    }

    for (index, size) in &model {
        assert_eq!(cache.try_get(index).map(|d| d.len()), Some(*size));
    }
}

#[test]
fn test_duplicate_put_keeps_original() {
    let cache = MemoryCache::new();
    let index = make_index(3, 5, 10, 11);

    assert!(cache.put(index, Bytes::from_static(b"original")));
    assert!(!cache.put(index, Bytes::from_static(b"replacement")));
    assert_eq!(cache.try_get(&index), Some(Bytes::from_static(b"original")));
}

#[test]
fn test_same_coords_different_provider_are_distinct() {
    let cache = MemoryCache::new();
    let streets = make_index(1, 5, 10, 11);
    let satellite = make_index(2, 5, 10, 11);

    cache.put(streets, Bytes::from_static(b"streets"));
    cache.put(satellite, Bytes::from_static(b"satellite"));

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.try_get(&streets), Some(Bytes::from_static(b"streets")));
    assert_eq!(cache.try_get(&satellite), Some(Bytes::from_static(b"satellite")));
}

#[test]
fn test_one_tile_capacity_scenario() {
    let cache = MemoryCache::with_capacity_mb(1.0);
    let tile_a = make_index(1, 8, 1, 1);
    let tile_b = make_index(1, 8, 1, 2);
    let bytes = (0.6 * MB as f64) as usize;

    assert!(cache.put(tile_a, Bytes::from(vec![0u8; bytes])));
    assert!((cache.size() - 0.6).abs() < 1e-6);

    assert!(cache.put(tile_b, Bytes::from(vec![0u8; bytes])));
    assert!((cache.size() - 0.6).abs() < 1e-6);
    assert_eq!(cache.len(), 1);
    assert!(cache.try_get(&tile_a).is_none());
    assert!(cache.try_get(&tile_b).is_some());
}

#[test]
fn test_clear_then_reuse() {
    let cache = MemoryCache::with_capacity_mb(1.0);
    for x in 0..3 {
        cache.put(make_index(1, 4, x, 0), Bytes::from(vec![0u8; MB / 4]));
    }

    cache.clear();
    assert_eq!(cache.size(), 0.0);
    for x in 0..3 {
        assert!(cache.try_get(&make_index(1, 4, x, 0)).is_none());
    }

    // Previously held keys can be inserted again
    assert!(cache.put(make_index(1, 4, 0, 0), Bytes::from(vec![0u8; 10])));
    assert_eq!(cache.size_bytes(), 10);
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_readers_see_whole_entries_only() {
    let cache = Arc::new(MemoryCache::with_capacity_mb(1.0));

    // Every tile's payload is its x coordinate repeated, so a torn read
    // would show up as mixed bytes or a wrong length.
    let writers: Vec<_> = (0..4i64)
        .map(|w| {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || {
                for x in 0..500i64 {
                    let byte = (x % 251) as u8;
                    let len = 1024 + (x as usize % 7) * 512;
                    cache.put(make_index(1, 14, x, w), Bytes::from(vec![byte; len]));
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..4i64)
        .map(|w| {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || {
                for _ in 0..3 {
                    for x in 0..500i64 {
                        if let Some(data) = cache.try_get(&make_index(1, 14, x, w)) {
                            let byte = (x % 251) as u8;
                            assert_eq!(data.len(), 1024 + (x as usize % 7) * 512);
                            assert!(data.iter().all(|b| *b == byte));
                        }
                    }
                }
            })
        })
        .collect();

    for handle in writers.into_iter().chain(readers) {
        handle.join().unwrap();
    }

    assert!(cache.size() <= 1.0);
    let stats = cache.stats();
    assert_eq!(stats.entries, cache.len());
    assert_eq!(stats.entries as u64 + stats.evictions, 2_000);
}
