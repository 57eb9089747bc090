//! Upsert benchmark CLI
//!
//! Truncates the products table, then times insert and update phases for each
//! write strategy and prints the results.

use clap::Parser;
use std::io;
use std::path::PathBuf;
use tracing::{info, Level};
use upsert_bench::logging::init_logging;
use upsert_bench::{
    Backend, BenchConfig, BenchmarkRunner, MemoryStore, OutputFormat, ProductStore,
    ResultReporter, SqliteStore,
};

#[derive(Parser)]
#[command(name = "upsert-bench")]
#[command(about = "Compare upsert strategies against a products table", version)]
struct Cli {
    /// JSON configuration file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Products generated for the insert phase
    #[arg(long)]
    initial: Option<usize>,

    /// Products appended for the update phase
    #[arg(long)]
    extra: Option<usize>,

    /// Rows per chunk for the chunked strategy
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Seed the price generator for repeatable runs
    #[arg(long)]
    seed: Option<u64>,

    /// Storage backend
    #[arg(long, value_enum)]
    backend: Option<Backend>,

    /// SQLite database file (in memory when omitted)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Strategies to run, in order: conditional, single, chunked[:SIZE]
    #[arg(short, long = "strategy")]
    strategies: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: Level,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn into_config(self) -> upsert_bench::Result<(BenchConfig, OutputFormat)> {
        let mut config = match &self.config {
            Some(path) => BenchConfig::from_json_file(path)?,
            None => BenchConfig::default(),
        };

        if let Some(initial) = self.initial {
            config.initial_count = initial;
        }
        if let Some(extra) = self.extra {
            config.extra_count = extra;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if self.database.is_some() {
            config.database = self.database;
        }
        if !self.strategies.is_empty() {
            config.strategies = self.strategies;
        }

        config.validate()?;
        Ok((config, self.format))
    }
}

fn open_store(config: &BenchConfig) -> upsert_bench::Result<Box<dyn ProductStore>> {
    let store: Box<dyn ProductStore> = match (config.backend, &config.database) {
        (Backend::Sqlite, Some(path)) => Box::new(SqliteStore::open(path)?),
        (Backend::Sqlite, None) => Box::new(SqliteStore::open_in_memory()?),
        (Backend::Memory, _) => Box::new(MemoryStore::new()),
    };
    Ok(store)
}

fn run(cli: Cli) -> upsert_bench::Result<()> {
    let (config, format) = cli.into_config()?;
    let strategies = config.resolve_strategies()?;

    info!(
        initial = config.initial_count,
        extra = config.extra_count,
        batch_size = config.batch_size,
        backend = ?config.backend,
        seed = ?config.seed,
        "Starting upsert benchmark"
    );

    let store = open_store(&config)?;
    let mut runner = BenchmarkRunner::from_config(store, &config);
    let results = runner.run_all(&strategies)?;

    ResultReporter::report(&results, format, io::stdout().lock())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level, cli.log_json);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(e.error_code());
    }
}
