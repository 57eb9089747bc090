//! Synthetic workload generation.
//!
//! Builds the initial product set for a trial and the "updated" set that follows
//! it: every existing product re-priced plus a tail of brand-new products.

use crate::error::{Error, Result};
use crate::product::{Product, ProductSet, MAX_ITEM_INDEX, MAX_PRICE};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;
use tracing::debug;

/// Index range for `count` keys from `start`, rejecting keys wider than the fixed width.
fn key_range(start: u64, count: usize) -> Result<Range<u64>> {
    let end = start
        .checked_add(count as u64)
        .filter(|end| count == 0 || *end - 1 <= MAX_ITEM_INDEX)
        .ok_or_else(|| {
            Error::Config(format!(
                "{count} keys from index {start} exceed the largest item_ref {MAX_ITEM_INDEX}"
            ))
        })?;
    Ok(start..end)
}

pub struct ProductGenerator<R: Rng = StdRng> {
    rng: R,
}

impl ProductGenerator<StdRng> {
    /// Unseeded generator; prices differ on every run.
    pub fn from_os_rng() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Seeded generator for repeatable workloads.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ProductGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    fn random_price(&mut self) -> u32 {
        self.rng.random_range(0..=MAX_PRICE)
    }

    /// Produce `count` products keyed from `start_index` upward, shuffled.
    pub fn generate(&mut self, count: usize, start_index: u64) -> Result<ProductSet> {
        let indices = key_range(start_index, count)?;

        let mut products = Vec::with_capacity(count);
        for index in indices {
            let price = self.random_price();
            products.push(Product::new(index, price));
        }

        let mut set = ProductSet::new(products);
        set.shuffle(&mut self.rng);
        debug!(count, start_index, "Generated product data");
        Ok(set)
    }

    /// Re-price every product in `existing` and append `extra_count` new ones.
    ///
    /// New keys continue from the highest existing index, or from 1 when
    /// `existing` is empty. The combined set is shuffled.
    pub fn mutate(&mut self, existing: ProductSet, extra_count: usize) -> Result<ProductSet> {
        let next_index = match existing.max_index() {
            Some(max) => max.checked_add(1).ok_or_else(|| {
                Error::Config(format!("no key index follows {max}"))
            })?,
            None => 1,
        };
        let indices = key_range(next_index, extra_count)?;

        let mut products = existing.into_inner();
        products.reserve(extra_count);
        for product in products.iter_mut() {
            product.price = self.random_price();
        }

        let repriced = products.len();
        for index in indices {
            let price = self.random_price();
            products.push(Product::new(index, price));
        }

        let mut set = ProductSet::new(products);
        set.shuffle(&mut self.rng);
        debug!(repriced, extra_count, next_index, "Generated updated product data");
        Ok(set)
    }
}
