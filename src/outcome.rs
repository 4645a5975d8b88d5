//! Per-dataset outcomes and the run-level ledger that aggregates them.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Why a dataset was skipped. All of these are recoverable: the loop logs
/// the path and moves on to the next dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// Copy mode found nothing matching the artifact pattern.
    NoArtifact,
    /// Every destination file for this dataset already existed (no force).
    AlreadyExists,
    /// Sample mode found an aggregate artifact already inside the dataset.
    AlreadyProcessed,
    /// The external sampler reported no histogram inputs.
    NoInput,
}

/// Result of processing one dataset. Fatal conditions are `Err` at the
/// processing layer, not a variant here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Success,
    Skipped(SkipReason),
}

/// Why the run stopped handing out new datasets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// Enumeration ran out of datasets.
    Exhausted,
    /// The success quota was reached; benign, exit 0.
    QuotaReached,
}

#[derive(Clone, Debug, Serialize)]
pub struct UnitReport {
    pub dataset: PathBuf,
    pub outcome: Outcome,
}

/// Final run report. `succeeded`/`skipped` are derived counts so the JSON
/// summary can be consumed without re-walking `reports`.
#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    pub finished_at: String,
    pub stop: StopReason,
    pub succeeded: usize,
    pub skipped: usize,
    pub reports: Vec<UnitReport>,
}

impl RunSummary {
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let out = File::create(path)
            .with_context(|| format!("creating summary file {}", path.display()))?;
        let mut w = BufWriter::new(out);
        serde_json::to_writer_pretty(&mut w, self)?;
        w.flush()?;
        Ok(())
    }
}

/// Collects outcomes across datasets; safe for concurrent submission from a
/// worker pool.
pub struct RunLedger {
    reports: Mutex<Vec<UnitReport>>,
}

impl RunLedger {
    pub fn new() -> Self {
        Self { reports: Mutex::new(Vec::new()) }
    }

    pub fn record(&self, dataset: &Path, outcome: Outcome) {
        self.reports
            .lock()
            .push(UnitReport { dataset: dataset.to_path_buf(), outcome });
    }

    pub fn finish(self, stop: StopReason) -> RunSummary {
        let reports = self.reports.into_inner();
        let succeeded = reports.iter().filter(|r| r.outcome == Outcome::Success).count();
        let skipped = reports.len() - succeeded;
        let finished_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| String::from("unknown"));
        RunSummary { finished_at, stop, succeeded, skipped, reports }
    }
}

impl Default for RunLedger {
    fn default() -> Self {
        Self::new()
    }
}
