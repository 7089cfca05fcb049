//! Property-Based Tests for the cache tiers
//!
//! # Test Properties
//!
//! 1. **Model equivalence**: a MemoryCache behaves like a HashMap under any
//!    sequence of set/remove/remove_all
//! 2. **Composition reads**: a composed pair returns the near value when
//!    present, otherwise the far value

#![cfg(test)]

use std::collections::HashMap;
use std::sync::Arc;

use proptest::prelude::*;

use super::compose::compose;
use super::memory::MemoryCache;
use super::traits::SyncCache;

#[derive(Debug, Clone)]
enum Op {
    Set(u8, i32),
    Remove(u8),
    RemoveAll,
}

// =============================================================================
// Property Strategies
// =============================================================================

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        8 => (0u8..16, any::<i32>()).prop_map(|(k, v)| Op::Set(k, v)),
        3 => (0u8..16).prop_map(Op::Remove),
        1 => Just(Op::RemoveAll),
    ]
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_memory_matches_model(ops in prop::collection::vec(op_strategy(), 0..64)) {
        let cache: MemoryCache<u8, i32> = MemoryCache::new("prop");
        let mut model = HashMap::new();

        for op in ops {
            match op {
                Op::Set(k, v) => {
                    prop_assert!(cache.set(k, v).is_ok());
                    model.insert(k, v);
                    prop_assert_eq!(cache.get(&k), Some(v));
                }
                Op::Remove(k) => {
                    prop_assert!(cache.remove(&k).is_ok());
                    model.remove(&k);
                    prop_assert_eq!(cache.get(&k), None);
                }
                Op::RemoveAll => {
                    prop_assert!(cache.remove_all().is_ok());
                    model.clear();
                    prop_assert!(cache.keys().is_empty());
                }
            }
        }

        prop_assert_eq!(cache.dump(), model);
    }

    #[test]
    fn prop_pair_prefers_near(
        near_entries in prop::collection::hash_map(0u8..8, any::<i32>(), 0..8),
        far_entries in prop::collection::hash_map(0u8..8, any::<i32>(), 0..8),
    ) {
        let near = Arc::new(MemoryCache::new("near"));
        let far = Arc::new(MemoryCache::new("far"));
        for (k, v) in &near_entries {
            near.set(*k, *v).unwrap();
        }
        for (k, v) in &far_entries {
            far.set(*k, *v).unwrap();
        }

        let pair = compose(Arc::clone(&near), Arc::clone(&far));
        for k in 0u8..8 {
            let expected = near_entries.get(&k).or_else(|| far_entries.get(&k)).copied();
            prop_assert_eq!(pair.get(&k), expected);
            if expected.is_some() {
                prop_assert_eq!(near.get(&k), expected);
            }
        }
    }
}
