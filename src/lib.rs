//! Upsert strategy benchmark.
//!
//! Loads synthetic products into a `products` table keyed by `item_ref` with
//! three write strategies and times the insert and update phases of each.

pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
pub mod product;
pub mod report;
pub mod runner;
pub mod storage;
pub mod strategy;

pub use config::{Backend, BenchConfig};
pub use error::{Error, Result};
pub use generator::ProductGenerator;
pub use product::{Product, ProductSet};
pub use report::{OutputFormat, ResultReporter};
pub use runner::{BenchmarkResults, BenchmarkRunner, PhaseResult, TrialPhase, TrialResult};
pub use storage::{MemoryStore, ProductStore, SqliteStore, StoreCall};
pub use strategy::Strategy;
