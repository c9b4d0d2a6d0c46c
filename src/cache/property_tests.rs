//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store against a plain HashMap model.

use proptest::prelude::*;
use std::collections::HashMap;
use std::time::Duration;

use crate::cache::{CacheStore, SqliteBackend};
use crate::error::StoreError;

// == Test Configuration ==
const TEST_TTL: Duration = Duration::from_secs(300);

// == Strategies ==
/// Generates keys shaped like image filenames
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-e]{1,2}\\.jpg".prop_map(|s| s)
}

fn value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..64)
}

#[derive(Debug, Clone)]
enum StoreOp {
    Set { key: String, value: Vec<u8> },
    Get { key: String },
    GetOrSet { key: String, value: Vec<u8> },
}

fn store_op_strategy() -> impl Strategy<Value = StoreOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| StoreOp::Set { key, value }),
        key_strategy().prop_map(|key| StoreOp::Get { key }),
        (key_strategy(), value_strategy())
            .prop_map(|(key, value)| StoreOp::GetOrSet { key, value }),
    ]
}

/// Runs `ops` against `store`, returning the model it should match along
/// with the expected (hits, misses, writes).
fn apply_ops(store: &CacheStore, ops: Vec<StoreOp>) -> (HashMap<String, Vec<u8>>, u64, u64, u64) {
    let mut model = HashMap::new();
    let (mut hits, mut misses, mut writes) = (0, 0, 0);

    for op in ops {
        match op {
            StoreOp::Set { key, value } => {
                store
                    .update(|txn| {
                        txn.set_with_ttl(key.clone(), value.clone(), TEST_TTL);
                        Ok::<_, StoreError>(())
                    })
                    .unwrap();
                model.insert(key, value);
                writes += 1;
            }
            StoreOp::Get { key } => {
                let found = store.update(|txn| txn.get(&key)).unwrap();
                assert_eq!(found.as_ref(), model.get(&key));
                if found.is_some() {
                    hits += 1;
                } else {
                    misses += 1;
                }
            }
            StoreOp::GetOrSet { key, value } => {
                let result = store
                    .update(|txn| {
                        if let Some(existing) = txn.get(&key)? {
                            return Ok::<_, StoreError>(existing);
                        }
                        txn.set_with_ttl(key.clone(), value.clone(), TEST_TTL);
                        Ok(value.clone())
                    })
                    .unwrap();
                if model.contains_key(&key) {
                    hits += 1;
                } else {
                    misses += 1;
                    writes += 1;
                    model.insert(key.clone(), value);
                }
                assert_eq!(Some(&result), model.get(&key));
            }
        }
    }

    (model, hits, misses, writes)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Every key holds exactly the last value committed for it, and the
    // counters account for every transactional read and write.
    #[test]
    fn prop_memory_store_matches_model(ops in prop::collection::vec(store_op_strategy(), 1..40)) {
        let store = CacheStore::in_memory();
        let (model, hits, misses, writes) = apply_ops(&store, ops);

        let stats = store.stats().unwrap();
        prop_assert_eq!(stats.hits, hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, misses, "Misses mismatch");
        prop_assert_eq!(stats.writes, writes, "Writes mismatch");
        prop_assert_eq!(stats.total_entries, model.len(), "Total entries mismatch");
        prop_assert_eq!(stats.conflicts, 0);
    }

    #[test]
    fn prop_sqlite_store_matches_model(ops in prop::collection::vec(store_op_strategy(), 1..40)) {
        let store = CacheStore::new(SqliteBackend::open_in_memory().unwrap());
        let (model, _, _, writes) = apply_ops(&store, ops);

        prop_assert_eq!(store.len().unwrap(), model.len());
        prop_assert_eq!(store.stats().unwrap().writes, writes);
    }

    // A get-or-set repeated on the same key writes once and always returns
    // the first value.
    #[test]
    fn prop_get_or_set_is_idempotent(
        key in key_strategy(),
        first in value_strategy(),
        rest in prop::collection::vec(value_strategy(), 1..10),
    ) {
        let store = CacheStore::in_memory();
        let mut ops = vec![StoreOp::GetOrSet { key: key.clone(), value: first.clone() }];
        ops.extend(rest.into_iter().map(|value| StoreOp::GetOrSet { key: key.clone(), value }));

        apply_ops(&store, ops);

        prop_assert_eq!(store.stats().unwrap().writes, 1);
        let stored = store.update(|txn| txn.get(&key)).unwrap();
        prop_assert_eq!(stored, Some(first));
    }
}
