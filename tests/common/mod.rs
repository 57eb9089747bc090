#![allow(dead_code)]

use std::collections::HashMap;
use upsert_bench::{
    MemoryStore, Product, ProductGenerator, ProductSet, ProductStore, SqliteStore, Strategy,
};

pub const SMALL_TEST_SIZE: usize = 10;
pub const MEDIUM_TEST_SIZE: usize = 1000;

pub fn stores() -> Vec<(&'static str, Box<dyn ProductStore>)> {
    vec![
        ("memory", Box::new(MemoryStore::new())),
        (
            "sqlite",
            Box::new(SqliteStore::open_in_memory().expect("Failed to open in-memory SQLite")),
        ),
    ]
}

pub fn all_strategies() -> Vec<Strategy> {
    Strategy::defaults(5)
}

pub fn generator() -> ProductGenerator {
    ProductGenerator::seeded(0x5eed)
}

/// Prices keyed by `item_ref`, as stored.
pub fn stored_prices<S: ProductStore + ?Sized>(store: &S, set: &ProductSet) -> HashMap<String, u32> {
    set.iter()
        .map(|product| {
            let row = store
                .get(&product.item_ref)
                .expect("lookup failed")
                .unwrap_or_else(|| panic!("{} missing from storage", product.item_ref));
            (row.item_ref, row.price)
        })
        .collect()
}

pub fn expected_prices(set: &ProductSet) -> HashMap<String, u32> {
    set.iter()
        .map(|product: &Product| (product.item_ref.clone(), product.price))
        .collect()
}
