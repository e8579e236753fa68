// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Identifier issuance under contention
//!
//! Checks the uniqueness invariant: N identifiers issued concurrently are
//! N distinct values and the high-water mark advances by exactly N.

use ecs_core::ecs::{EntityId, IdRegistry, RegistryConfig};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

const THREADS: usize = 8;
const ROUNDS: usize = 500;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_concurrent_mixed_issuance_is_unique() {
    init_logging();
    let registry = Arc::new(IdRegistry::with_config(
        RegistryConfig::default().starting_after(1_000),
    ));
    let before = registry.high_water();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let mut ids = Vec::new();
                for round in 0..ROUNDS {
                    if (t + round) % 3 == 0 {
                        let block = registry.next_ids(round % 7 + 1);
                        // every block is contiguous and ascending
                        assert!(block.windows(2).all(|w| w[1].raw() == w[0].raw() + 1));
                        ids.extend(block);
                    } else {
                        ids.push(registry.next_id());
                    }
                }
                ids
            })
        })
        .collect();

    let all: Vec<EntityId> = handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();
    let distinct: HashSet<EntityId> = all.iter().copied().collect();

    assert_eq!(distinct.len(), all.len());
    let max = all.iter().map(EntityId::raw).max().unwrap();
    assert_eq!(max, before + all.len() as u64);
    assert_eq!(registry.high_water(), max);
    assert_eq!(registry.stats().issued, all.len() as u64);
    assert_eq!(registry.stats().wraparounds, 0);
}

#[test]
fn test_concurrent_entity_batches() {
    let registry = Arc::new(IdRegistry::new());

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                registry
                    .new_entities(100)
                    .into_iter()
                    .map(|entity| entity.id())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(seen.insert(id), "{} issued twice", id);
        }
    }
    assert_eq!(seen.len(), THREADS * 100);
}

#[test]
fn test_exhaustion_is_observable() {
    init_logging();
    let registry =
        IdRegistry::with_config(RegistryConfig::default().starting_after(u64::MAX - 3));

    assert_eq!(registry.next_id().raw(), u64::MAX - 2);
    assert_eq!(registry.next_id().raw(), u64::MAX - 1);
    assert_eq!(registry.stats().wraparounds, 0);

    // u64::MAX itself is never issued
    assert_eq!(registry.next_id().raw(), 1);
    assert_eq!(registry.stats().wraparounds, 1);
}

#[test]
fn test_isolated_registries() {
    let a = IdRegistry::new();
    let b = IdRegistry::new();
    assert_eq!(a.next_id(), b.next_id());
    a.next_ids(10);
    assert_eq!(b.high_water(), 1);
}
