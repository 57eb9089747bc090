//! Result formatting. No computation happens here beyond unit conversion.

use crate::error::Result;
use crate::runner::{BenchmarkResults, PhaseResult, TrialResult};
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

const BANNER_RULE: &str = "=============================";
const BANNER_TITLE: &str = "========== RESULTS ==========";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Seconds with exactly three decimals.
pub fn format_secs(elapsed: Duration) -> String {
    format!("{:.3}", elapsed.as_secs_f64())
}

#[derive(Serialize)]
struct PhaseReport {
    secs: f64,
    records: usize,
    round_trips: usize,
}

impl From<&PhaseResult> for PhaseReport {
    fn from(phase: &PhaseResult) -> Self {
        Self {
            secs: (phase.elapsed.as_secs_f64() * 1000.0).round() / 1000.0,
            records: phase.records,
            round_trips: phase.round_trips,
        }
    }
}

#[derive(Serialize)]
struct TrialReport {
    strategy: String,
    label: String,
    insert: PhaseReport,
    update: PhaseReport,
    final_rows: usize,
}

impl From<&TrialResult> for TrialReport {
    fn from(trial: &TrialResult) -> Self {
        Self {
            strategy: trial.strategy.to_string(),
            label: trial.label(),
            insert: PhaseReport::from(&trial.insert),
            update: PhaseReport::from(&trial.update),
            final_rows: trial.final_rows,
        }
    }
}

pub struct ResultReporter;

impl ResultReporter {
    pub fn render_text(results: &BenchmarkResults) -> String {
        let mut out = format!("{BANNER_RULE}\n{BANNER_TITLE}\n{BANNER_RULE}\n");
        for trial in &results.trials {
            out.push_str(&format!(
                "TEST: {}\n  INSERT: {} secs\n  UPDATE: {} secs\n",
                trial.label(),
                format_secs(trial.insert.elapsed),
                format_secs(trial.update.elapsed),
            ));
        }
        out
    }

    pub fn render_json(results: &BenchmarkResults) -> Result<String> {
        let trials: Vec<TrialReport> = results.trials.iter().map(TrialReport::from).collect();
        Ok(serde_json::to_string_pretty(&trials)?)
    }

    pub fn report<W: Write>(
        results: &BenchmarkResults,
        format: OutputFormat,
        mut out: W,
    ) -> Result<()> {
        let rendered = match format {
            OutputFormat::Text => Self::render_text(results),
            OutputFormat::Json => Self::render_json(results)? + "\n",
        };
        out.write_all(rendered.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}
