//! Trial orchestration.
//!
//! A trial walks `Reset -> GenerateInitial -> InsertPhase -> Mutate ->
//! UpdatePhase -> Done` for one strategy. Only the two write phases are timed;
//! generation and mutation happen outside the clock. The first storage error
//! ends the run.

use crate::config::BenchConfig;
use crate::error::Result;
use crate::generator::ProductGenerator;
use crate::product::ProductSet;
use crate::storage::ProductStore;
use crate::strategy::Strategy;
use rand::rngs::StdRng;
use rand::Rng;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

/// Key index of the first generated product.
const FIRST_INDEX: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialPhase {
    Reset,
    GenerateInitial,
    InsertPhase,
    Mutate,
    UpdatePhase,
    Done,
}

impl fmt::Display for TrialPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrialPhase::Reset => "reset",
            TrialPhase::GenerateInitial => "generate_initial",
            TrialPhase::InsertPhase => "insert",
            TrialPhase::Mutate => "mutate",
            TrialPhase::UpdatePhase => "update",
            TrialPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Outcome of one timed write phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhaseResult {
    pub elapsed: Duration,
    pub records: usize,
    pub round_trips: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialResult {
    pub strategy: Strategy,
    pub insert: PhaseResult,
    pub update: PhaseResult,
    /// Rows in storage once the update phase finished
    pub final_rows: usize,
}

impl TrialResult {
    pub fn label(&self) -> String {
        self.strategy.label()
    }
}

/// Trial results in the order the strategies ran.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BenchmarkResults {
    pub trials: Vec<TrialResult>,
}

impl BenchmarkResults {
    pub fn get(&self, strategy: &Strategy) -> Option<&TrialResult> {
        self.trials.iter().find(|trial| trial.strategy == *strategy)
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }
}

pub struct BenchmarkRunner<S: ProductStore, R: Rng = StdRng> {
    store: S,
    generator: ProductGenerator<R>,
    initial_count: usize,
    extra_count: usize,
}

impl<S: ProductStore> BenchmarkRunner<S, StdRng> {
    /// Runner sized and seeded from `config`.
    pub fn from_config(store: S, config: &BenchConfig) -> Self {
        let generator = match config.seed {
            Some(seed) => ProductGenerator::seeded(seed),
            None => ProductGenerator::from_os_rng(),
        };
        Self::new(store, generator, config.initial_count, config.extra_count)
    }
}

impl<S: ProductStore, R: Rng> BenchmarkRunner<S, R> {
    pub fn new(
        store: S,
        generator: ProductGenerator<R>,
        initial_count: usize,
        extra_count: usize,
    ) -> Self {
        Self {
            store,
            generator,
            initial_count,
            extra_count,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Clear the products table. Safe on an empty table.
    pub fn reset(&mut self) -> Result<()> {
        info!("Truncating database table...");
        self.store.truncate()
    }

    fn enter(&self, strategy: &Strategy, phase: TrialPhase) {
        debug!(strategy = strategy.name(), phase = %phase, "Trial phase");
    }

    fn timed_write(
        &mut self,
        strategy: &Strategy,
        products: &ProductSet,
        verb: &str,
    ) -> Result<PhaseResult> {
        info!("Performing {verb}s...");
        let (elapsed, round_trips) = strategy.apply_counted(&mut self.store, products)?;
        info!(
            strategy = strategy.name(),
            records = products.len(),
            round_trips,
            elapsed_us = elapsed.as_micros() as u64,
            "Finished performing {verb}s!"
        );
        Ok(PhaseResult {
            elapsed,
            records: products.len(),
            round_trips,
        })
    }

    /// Run one full insert-then-update trial for `strategy`.
    pub fn run_trial(&mut self, strategy: &Strategy) -> Result<TrialResult> {
        strategy.validate()?;

        self.enter(strategy, TrialPhase::Reset);
        self.reset()?;

        self.enter(strategy, TrialPhase::GenerateInitial);
        info!(count = self.initial_count, "Generating product data...");
        let initial = self.generator.generate(self.initial_count, FIRST_INDEX)?;

        self.enter(strategy, TrialPhase::InsertPhase);
        let insert = self.timed_write(strategy, &initial, "INSERT")?;

        self.enter(strategy, TrialPhase::Mutate);
        info!(extra = self.extra_count, "Generating updated product data...");
        let updated = self.generator.mutate(initial, self.extra_count)?;

        self.enter(strategy, TrialPhase::UpdatePhase);
        let update = self.timed_write(strategy, &updated, "UPDATE")?;

        self.enter(strategy, TrialPhase::Done);
        let final_rows = self.store.count()?;

        Ok(TrialResult {
            strategy: *strategy,
            insert,
            update,
            final_rows,
        })
    }

    /// Run each strategy in order, each on a freshly truncated table.
    pub fn run_all(&mut self, strategies: &[Strategy]) -> Result<BenchmarkResults> {
        let mut results = BenchmarkResults::default();
        for strategy in strategies {
            info!("Testing with {}...", strategy.label());
            let trial = self.run_trial(strategy)?;
            info!("Finished testing with {}!", strategy.label());
            results.trials.push(trial);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StoreCall};

    fn runner(initial: usize, extra: usize) -> BenchmarkRunner<MemoryStore> {
        BenchmarkRunner::new(MemoryStore::new(), ProductGenerator::seeded(11), initial, extra)
    }

    #[test]
    fn test_trial_counts() {
        let mut runner = runner(10, 5);
        let trial = runner.run_trial(&Strategy::PerRecordConditionalUpsert).unwrap();

        assert_eq!(trial.insert.records, 10);
        assert_eq!(trial.insert.round_trips, 10);
        assert_eq!(trial.update.records, 15);
        assert_eq!(trial.update.round_trips, 15);
        assert_eq!(trial.final_rows, 15);
    }

    #[test]
    fn test_trial_starts_from_empty_table() {
        let mut runner = runner(4, 2);
        let log = runner.store().call_log();
        runner.run_trial(&Strategy::SingleCallBulkUpsert).unwrap();
        let trial = runner
            .run_trial(&Strategy::ChunkedBulkUpsert { batch_size: 3 })
            .unwrap();

        assert_eq!(trial.final_rows, 6);
        let truncates = log
            .lock()
            .iter()
            .filter(|call| **call == StoreCall::Truncate)
            .count();
        assert_eq!(truncates, 2);
    }

    #[test]
    fn test_run_all_preserves_order() {
        let mut runner = runner(12, 3);
        let strategies = Strategy::defaults(5);
        let results = runner.run_all(&strategies).unwrap();

        let ran: Vec<_> = results.trials.iter().map(|t| t.strategy).collect();
        assert_eq!(ran, strategies);

        let chunked = results.get(&Strategy::ChunkedBulkUpsert { batch_size: 5 }).unwrap();
        assert_eq!(chunked.insert.round_trips, 3);
        assert_eq!(chunked.update.round_trips, 3);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut runner = runner(3, 0);
        runner.reset().unwrap();
        runner.reset().unwrap();
        assert_eq!(runner.store().count().unwrap(), 0);
    }

    #[test]
    fn test_key_space_exhaustion_aborts_trial() {
        let mut runner = runner(crate::product::MAX_ITEM_INDEX as usize + 1, 0);
        let log = runner.store().call_log();

        let err = runner.run_trial(&Strategy::SingleCallBulkUpsert).unwrap_err();
        assert!(matches!(err, crate::error::Error::Config(_)));
        assert_eq!(*log.lock(), vec![StoreCall::Truncate]);
    }

    #[test]
    fn test_empty_workload() {
        let mut runner = runner(0, 0);
        let trial = runner.run_trial(&Strategy::SingleCallBulkUpsert).unwrap();
        assert_eq!(trial.insert, PhaseResult::default());
        assert_eq!(trial.update, PhaseResult::default());
        assert_eq!(trial.final_rows, 0);
    }
}
