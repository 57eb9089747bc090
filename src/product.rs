//! Product records and the ordered sets the strategies consume.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Width of the zero-padded `item_ref` key.
pub const ITEM_REF_WIDTH: usize = 8;

/// Largest index that still renders in `ITEM_REF_WIDTH` digits.
pub const MAX_ITEM_INDEX: u64 = 99_999_999;

/// Inclusive upper bound of a generated price.
pub const MAX_PRICE: u32 = 50_000;

pub const PRODUCT_TITLE: &str = "Large birthday cake";
pub const PRODUCT_DESCRIPTION: &str = "A large, but extremely tasty chocolate birthday cake";

/// Render an index as a fixed-width `item_ref`. Indices above
/// `MAX_ITEM_INDEX` do not fit the width.
pub fn format_item_ref(index: u64) -> String {
    format!("{:0width$}", index, width = ITEM_REF_WIDTH)
}

/// Parse an `item_ref` back into its index.
pub fn parse_item_ref(item_ref: &str) -> Option<u64> {
    if item_ref.is_empty() || !item_ref.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    item_ref.parse().ok()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub item_ref: String,
    pub title: String,
    pub description: String,
    pub price: u32,
}

impl Product {
    pub fn new(index: u64, price: u32) -> Self {
        Self {
            item_ref: format_item_ref(index),
            title: PRODUCT_TITLE.to_string(),
            description: PRODUCT_DESCRIPTION.to_string(),
            price,
        }
    }

    pub fn index(&self) -> Option<u64> {
        parse_item_ref(&self.item_ref)
    }

    /// True when the mutable columns differ from `other`.
    pub fn differs_from(&self, other: &Product) -> bool {
        self.title != other.title
            || self.description != other.description
            || self.price != other.price
    }
}

/// An ordered batch of products, fed to a strategy as one workload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductSet {
    products: Vec<Product>,
}

impl ProductSet {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Product> {
        self.products.iter()
    }

    pub fn as_slice(&self) -> &[Product] {
        &self.products
    }

    /// Randomize order so writes do not follow key order.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.products.shuffle(rng);
    }

    /// Highest parsed `item_ref` index, `None` for an empty set.
    pub fn max_index(&self) -> Option<u64> {
        self.products.iter().filter_map(Product::index).max()
    }

    pub fn into_inner(self) -> Vec<Product> {
        self.products
    }
}

impl From<Vec<Product>> for ProductSet {
    fn from(products: Vec<Product>) -> Self {
        Self::new(products)
    }
}

impl<'a> IntoIterator for &'a ProductSet {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.products.iter()
    }
}
