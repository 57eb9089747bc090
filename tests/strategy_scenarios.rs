mod common;

use common::*;
use upsert_bench::product::MAX_PRICE;
use upsert_bench::{MemoryStore, ProductSet, ProductStore, StoreCall, Strategy};

#[test]
fn test_insert_then_update_every_strategy_every_store() {
    for strategy in all_strategies() {
        for (backend, mut store) in stores() {
            let mut generator = generator();

            let initial = generator.generate(SMALL_TEST_SIZE, 1).unwrap();
            strategy.apply(&mut store, &initial).unwrap();
            assert_eq!(store.count().unwrap(), 10, "{strategy} on {backend}");
            for price in stored_prices(&store, &initial).values() {
                assert!(*price <= MAX_PRICE);
            }
            assert_eq!(stored_prices(&store, &initial), expected_prices(&initial));

            let updated = generator.mutate(initial.clone(), 5).unwrap();
            strategy.apply(&mut store, &updated).unwrap();
            assert_eq!(store.count().unwrap(), 15, "{strategy} on {backend}");
            assert_eq!(stored_prices(&store, &updated), expected_prices(&updated));

            for product in &initial {
                assert!(store.get(&product.item_ref).unwrap().is_some());
            }
        }
    }
}

#[test]
fn test_reapplying_same_keys_does_not_duplicate() {
    for strategy in all_strategies() {
        for (backend, mut store) in stores() {
            let mut generator = generator();
            let initial = generator.generate(MEDIUM_TEST_SIZE, 1).unwrap();
            strategy.apply(&mut store, &initial).unwrap();

            let repriced = generator.mutate(initial, 0).unwrap();
            strategy.apply(&mut store, &repriced).unwrap();

            assert_eq!(store.count().unwrap(), MEDIUM_TEST_SIZE, "{strategy} on {backend}");
            assert_eq!(stored_prices(&store, &repriced), expected_prices(&repriced));
        }
    }
}

#[test]
fn test_chunked_issues_three_calls_for_twelve_rows() {
    let mut store = MemoryStore::new();
    let set = generator().generate(12, 1).unwrap();

    let (_, round_trips) = Strategy::ChunkedBulkUpsert { batch_size: 5 }
        .apply_counted(&mut store, &set)
        .unwrap();

    assert_eq!(round_trips, 3);
    let sizes: Vec<usize> = store
        .calls()
        .into_iter()
        .map(|call| match call {
            StoreCall::BulkUpsert { rows } => rows,
            other => panic!("unexpected call {other:?}"),
        })
        .collect();
    assert_eq!(sizes, vec![5, 5, 2]);
    assert_eq!(store.count().unwrap(), 12);
}

#[test]
fn test_per_record_round_trips_match_records() {
    let mut store = MemoryStore::new();
    let set = generator().generate(25, 1).unwrap();
    let (_, round_trips) = Strategy::PerRecordConditionalUpsert
        .apply_counted(&mut store, &set)
        .unwrap();

    assert_eq!(round_trips, 25);
    assert_eq!(store.calls().len(), 25);
    assert!(store.calls().iter().all(|c| *c == StoreCall::FindOrCreate));
}

#[test]
fn test_empty_set_touches_nothing() {
    for strategy in all_strategies() {
        for (backend, mut store) in stores() {
            let elapsed = strategy.apply(&mut store, &ProductSet::default()).unwrap();
            assert!(elapsed.is_zero(), "{strategy} on {backend}");
            assert_eq!(store.count().unwrap(), 0);
        }
    }
}
