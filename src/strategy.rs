//! The three write strategies under comparison.

use crate::error::{Error, Result};
use crate::product::ProductSet;
use crate::storage::ProductStore;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

pub const DEFAULT_BATCH_SIZE: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Look each product up, then insert or update it.
    PerRecordConditionalUpsert,
    /// Bulk upsert primitive called with a single row per product.
    SingleCallBulkUpsert,
    /// Bulk upsert primitive called once per chunk of `batch_size` rows.
    ChunkedBulkUpsert { batch_size: usize },
}

impl Strategy {
    /// All strategies in reporting order.
    pub fn defaults(batch_size: usize) -> Vec<Strategy> {
        vec![
            Strategy::PerRecordConditionalUpsert,
            Strategy::SingleCallBulkUpsert,
            Strategy::ChunkedBulkUpsert { batch_size },
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::PerRecordConditionalUpsert => "conditional",
            Strategy::SingleCallBulkUpsert => "single",
            Strategy::ChunkedBulkUpsert { .. } => "chunked",
        }
    }

    pub fn label(&self) -> String {
        match self {
            Strategy::PerRecordConditionalUpsert => "updateOrCreate".to_string(),
            Strategy::SingleCallBulkUpsert => "upsert (singular)".to_string(),
            Strategy::ChunkedBulkUpsert { batch_size } => {
                format!("upsert (batch of {batch_size})")
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Strategy::ChunkedBulkUpsert { batch_size: 0 } => {
                Err(Error::Config("chunked upsert needs a batch size above 0".to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Write every product and return the number of store calls issued.
    pub fn write<S: ProductStore + ?Sized>(&self, store: &mut S, products: &ProductSet) -> Result<usize> {
        self.validate()?;
        self.write_validated(store, products)
    }

    fn write_validated<S: ProductStore + ?Sized>(
        &self,
        store: &mut S,
        products: &ProductSet,
    ) -> Result<usize> {
        let mut round_trips = 0;
        match self {
            Strategy::PerRecordConditionalUpsert => {
                for product in products {
                    store.find_or_create_and_update(product)?;
                    round_trips += 1;
                }
            }
            Strategy::SingleCallBulkUpsert => {
                for product in products {
                    store.bulk_upsert(std::slice::from_ref(product))?;
                    round_trips += 1;
                }
            }
            Strategy::ChunkedBulkUpsert { batch_size } => {
                for chunk in products.as_slice().chunks(*batch_size) {
                    store.bulk_upsert(chunk)?;
                    round_trips += 1;
                }
            }
        }
        Ok(round_trips)
    }

    /// Wall-clock time spent in `write`. Empty sets cost nothing.
    pub fn apply<S: ProductStore + ?Sized>(&self, store: &mut S, products: &ProductSet) -> Result<Duration> {
        self.apply_counted(store, products).map(|(elapsed, _)| elapsed)
    }

    /// Like `apply`, also returning the number of store calls.
    pub fn apply_counted<S: ProductStore + ?Sized>(
        &self,
        store: &mut S,
        products: &ProductSet,
    ) -> Result<(Duration, usize)> {
        self.validate()?;
        if products.is_empty() {
            return Ok((Duration::ZERO, 0));
        }

        let started_at = Instant::now();
        let round_trips = self.write_validated(store, products)?;
        Ok((started_at.elapsed(), round_trips))
    }

    /// Calls `write` will issue for `records` products.
    pub fn expected_round_trips(&self, records: usize) -> usize {
        match self {
            Strategy::PerRecordConditionalUpsert | Strategy::SingleCallBulkUpsert => records,
            Strategy::ChunkedBulkUpsert { batch_size } => records.div_ceil((*batch_size).max(1)),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::ChunkedBulkUpsert { batch_size } => write!(f, "chunked:{batch_size}"),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for Strategy {
    type Err = Error;

    /// Parses `conditional`, `single`, `chunked` or `chunked:<batch size>`.
    fn from_str(s: &str) -> Result<Self> {
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s, None),
        };

        let strategy = match (name.trim(), arg) {
            ("conditional", None) => Strategy::PerRecordConditionalUpsert,
            ("single", None) => Strategy::SingleCallBulkUpsert,
            ("chunked", None) => Strategy::ChunkedBulkUpsert {
                batch_size: DEFAULT_BATCH_SIZE,
            },
            ("chunked", Some(size)) => {
                let batch_size = size.trim().parse().map_err(|_| {
                    Error::Config(format!("invalid batch size in strategy '{s}'"))
                })?;
                Strategy::ChunkedBulkUpsert { batch_size }
            }
            _ => return Err(Error::Config(format!("unknown strategy '{s}'"))),
        };
        strategy.validate()?;
        Ok(strategy)
    }
}
