pub mod memory;
pub mod sqlite;

pub use memory::{MemoryStore, StoreCall};
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::product::Product;

/// Primitives a products table must offer to be benchmarked.
///
/// Every implementation is keyed by `item_ref`; the writable columns are
/// `title`, `description` and `price`.
pub trait ProductStore {
    /// Remove every row. Truncating an empty table succeeds.
    fn truncate(&mut self) -> Result<()>;

    /// Look the product up by key, insert it if missing, otherwise update it.
    fn find_or_create_and_update(&mut self, product: &Product) -> Result<()>;

    /// Insert or update all products in a single call, conflicting on `item_ref`.
    fn bulk_upsert(&mut self, products: &[Product]) -> Result<()>;

    /// Number of stored rows
    fn count(&self) -> Result<usize>;

    /// Fetch a stored product by key
    fn get(&self, item_ref: &str) -> Result<Option<Product>>;
}

impl<S: ProductStore + ?Sized> ProductStore for Box<S> {
    fn truncate(&mut self) -> Result<()> {
        (**self).truncate()
    }

    fn find_or_create_and_update(&mut self, product: &Product) -> Result<()> {
        (**self).find_or_create_and_update(product)
    }

    fn bulk_upsert(&mut self, products: &[Product]) -> Result<()> {
        (**self).bulk_upsert(products)
    }

    fn count(&self) -> Result<usize> {
        (**self).count()
    }

    fn get(&self, item_ref: &str) -> Result<Option<Product>> {
        (**self).get(item_ref)
    }
}
