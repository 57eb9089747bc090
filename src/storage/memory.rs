//! In-process products table.

use super::ProductStore;
use crate::error::Result;
use crate::product::Product;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A primitive invocation, as seen by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreCall {
    Truncate,
    FindOrCreate,
    BulkUpsert { rows: usize },
}

/// Ordered map keyed by `item_ref` that logs every primitive call.
///
/// The call log is shared so a caller can keep a handle after moving the
/// store into a runner.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: BTreeMap<String, Product>,
    calls: Arc<Mutex<Vec<StoreCall>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the call log
    pub fn call_log(&self) -> Arc<Mutex<Vec<StoreCall>>> {
        Arc::clone(&self.calls)
    }

    /// Snapshot of the calls made so far
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().push(call);
    }

    fn upsert_row(&mut self, product: &Product) {
        match self.rows.get_mut(&product.item_ref) {
            Some(row) => {
                row.title.clone_from(&product.title);
                row.description.clone_from(&product.description);
                row.price = product.price;
            }
            None => {
                self.rows.insert(product.item_ref.clone(), product.clone());
            }
        }
    }
}

impl ProductStore for MemoryStore {
    fn truncate(&mut self) -> Result<()> {
        self.record(StoreCall::Truncate);
        self.rows.clear();
        Ok(())
    }

    fn find_or_create_and_update(&mut self, product: &Product) -> Result<()> {
        self.record(StoreCall::FindOrCreate);
        let dirty = self
            .rows
            .get(&product.item_ref)
            .map_or(true, |row| row.differs_from(product));
        if dirty {
            self.upsert_row(product);
        }
        Ok(())
    }

    fn bulk_upsert(&mut self, products: &[Product]) -> Result<()> {
        if products.is_empty() {
            return Ok(());
        }
        self.record(StoreCall::BulkUpsert {
            rows: products.len(),
        });
        for product in products {
            self.upsert_row(product);
        }
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.rows.len())
    }

    fn get(&self, item_ref: &str) -> Result<Option<Product>> {
        Ok(self.rows.get(item_ref).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_or_create_then_update() {
        let mut store = MemoryStore::new();
        store.find_or_create_and_update(&Product::new(1, 10)).unwrap();
        store.find_or_create_and_update(&Product::new(1, 20)).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.get("00000001").unwrap().unwrap().price, 20);
        assert_eq!(
            store.calls(),
            vec![StoreCall::FindOrCreate, StoreCall::FindOrCreate]
        );
    }

    #[test]
    fn test_bulk_upsert_logs_rows() {
        let mut store = MemoryStore::new();
        let products: Vec<_> = (1..=4).map(|i| Product::new(i, 1)).collect();
        store.bulk_upsert(&products).unwrap();
        store.bulk_upsert(&[]).unwrap();

        assert_eq!(store.count().unwrap(), 4);
        assert_eq!(store.calls(), vec![StoreCall::BulkUpsert { rows: 4 }]);
    }

    #[test]
    fn test_call_log_survives_move() {
        let store = MemoryStore::new();
        let log = store.call_log();
        let mut boxed: Box<dyn ProductStore> = Box::new(store);
        boxed.truncate().unwrap();

        assert_eq!(*log.lock(), vec![StoreCall::Truncate]);
    }
}
