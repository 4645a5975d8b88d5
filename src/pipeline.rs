use crate::concurrency::for_each_limited;
use crate::config::SyncOptions;
use crate::depth::resolve_depth;
use crate::outcome::{Outcome, RunLedger, RunSummary, SkipReason, StopReason};
use crate::paths::{dataset_artifacts, discover_datasets, has_dataset_artifact, relative_to_anchor};
use crate::policy::{replicate_file, CopyOutcome};
use crate::progress::{make_count_progress, make_progress_bar_labeled, total_file_size};
use crate::quota::QuotaController;
use crate::sample::{job_histo_files, selection_rng};
use crate::sampler::HistoSampler;
use crate::util::init_tracing_once;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

#[derive(Clone)]
pub struct HistoSync {
    pub(crate) opts: SyncOptions,
}

impl HistoSync {
    pub fn new() -> Self {
        Self { opts: SyncOptions::default() }
    }

    // -------- Builder methods --------
    pub fn base_dir(mut self, base: impl AsRef<Path>) -> Self { self.opts = self.opts.with_base_dir(base); self }
    pub fn anchor_token(mut self, token: impl AsRef<str>) -> Self { self.opts = self.opts.with_anchor_token(token); self }
    pub fn anchor_distance(mut self, segments: usize) -> Self { self.opts = self.opts.with_anchor_distance(segments); self }
    pub fn sample_fraction(mut self, fraction: f64) -> Self { self.opts = self.opts.with_sample_fraction(fraction); self }
    pub fn max_datasets(mut self, max: usize) -> Self { self.opts = self.opts.with_max_datasets(max); self }
    pub fn force(mut self, yes: bool) -> Self { self.opts = self.opts.with_force(yes); self }
    pub fn dry_run(mut self, yes: bool) -> Self { self.opts = self.opts.with_dry_run(yes); self }
    pub fn seed(mut self, seed: u64) -> Self { self.opts = self.opts.with_seed(Some(seed)); self }
    pub fn unit_concurrency(mut self, n: usize) -> Self { self.opts = self.opts.with_unit_concurrency(n); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn progress_label(mut self, label: impl Into<String>) -> Self { self.opts = self.opts.with_progress_label(label); self }
    pub fn summary_json(mut self, path: impl AsRef<Path>) -> Self { self.opts = self.opts.with_summary_json(path); self }

    fn resolve_and_discover(&self) -> Result<Vec<PathBuf>> {
        let depth = resolve_depth(
            &self.opts.base_dir,
            &self.opts.anchor_token,
            self.opts.anchor_distance,
        )?;
        tracing::info!(
            "dataset directories sit {} level(s) below {}",
            depth,
            self.opts.base_dir.display()
        );
        let datasets = discover_datasets(&self.opts.base_dir, depth)?;
        if datasets.is_empty() {
            tracing::warn!("no dataset directories found under {}", self.opts.base_dir.display());
        } else {
            tracing::info!("planned {} dataset(s) for processing", datasets.len());
        }
        Ok(datasets)
    }

    fn finalize(&self, ledger: RunLedger, stop: StopReason) -> Result<RunSummary> {
        let summary = ledger.finish(stop);
        tracing::info!(
            "run finished: {:?}, {} succeeded, {} skipped",
            summary.stop,
            summary.succeeded,
            summary.skipped
        );
        if let Some(path) = &self.opts.summary_json {
            if self.opts.dry_run {
                tracing::info!("dryrun: summary not written to {}", path.display());
            } else {
                summary.write_json(path)?;
            }
        }
        Ok(summary)
    }

    /// Replicate every dataset-level aggregate artifact (`*.histo.hdf5`)
    /// found in the datasets below the base path into `dest_root`, mirroring
    /// the tree relative to the anchor segment.
    pub fn copy_dataset_histos(self, dest_root: impl AsRef<Path>) -> Result<RunSummary> {
        init_tracing_once();
        let dest_root = dest_root.as_ref();
        let datasets = self.resolve_and_discover()?;

        // Artifacts are discovered up front so the bar can show total bytes.
        let mut units: Vec<(PathBuf, Vec<PathBuf>)> = Vec::with_capacity(datasets.len());
        let mut all_files: Vec<PathBuf> = Vec::new();
        for dir in datasets {
            let files = dataset_artifacts(&dir)
                .with_context(|| format!("listing artifacts in {}", dir.display()))?;
            all_files.extend(files.iter().cloned());
            units.push((dir, files));
        }

        let pb = if self.opts.progress {
            Some(make_progress_bar_labeled(
                total_file_size(&all_files),
                self.opts.progress_label.as_deref().or(Some("Copy dataset histograms")),
            ))
        } else {
            None
        };

        let ledger = RunLedger::new();
        let token = self.opts.anchor_token.clone();
        let (force, dry_run) = (self.opts.force, self.opts.dry_run);

        for_each_limited(&units, self.opts.unit_concurrency, |(dir, files)| {
            if files.is_empty() {
                tracing::warn!("no histogram artifact in {}", dir.display());
                ledger.record(dir, Outcome::Skipped(SkipReason::NoArtifact));
                return Ok(());
            }
            let mut copied_any = false;
            for src in files {
                let rel = relative_to_anchor(src, &token)?;
                let dest = dest_root.join(rel);
                let out = replicate_file(src, &dest, force, dry_run)?;
                copied_any |= out != CopyOutcome::SkippedExisting;
                if let Some(pb) = &pb {
                    pb.inc(std::fs::metadata(src).map(|m| m.len()).unwrap_or(0));
                }
            }
            let outcome = if copied_any {
                Outcome::Success
            } else {
                Outcome::Skipped(SkipReason::AlreadyExists)
            };
            ledger.record(dir, outcome);
            Ok(())
        })?;

        if let Some(pb) = pb {
            pb.finish_with_message("done");
        }
        self.finalize(ledger, StopReason::Exhausted)
    }

    /// Replicate a sampled subset of each dataset's per-job histogram files
    /// (`<job>/histos/*.pkl`) into `dest_root`, anchor-relative. Sampling is
    /// two-level: first over marker directories, then over the files inside
    /// each selected one.
    pub fn copy_job_histos(self, dest_root: impl AsRef<Path>) -> Result<RunSummary> {
        init_tracing_once();
        let dest_root = dest_root.as_ref();
        let datasets = self.resolve_and_discover()?;

        let pb = if self.opts.progress {
            Some(make_count_progress(
                datasets.len() as u64,
                self.opts.progress_label.as_deref().unwrap_or("Copy job histograms"),
            ))
        } else {
            None
        };

        let ledger = RunLedger::new();
        let token = self.opts.anchor_token.clone();
        let (force, dry_run, fraction) = (self.opts.force, self.opts.dry_run, self.opts.sample_fraction);
        let seed = self.opts.seed;

        let indexed: Vec<(usize, PathBuf)> = datasets.into_iter().enumerate().collect();
        for_each_limited(&indexed, self.opts.unit_concurrency, |(idx, dir)| {
            // Per-dataset RNG: deterministic under a fixed seed even when
            // datasets are processed concurrently.
            let mut rng = selection_rng(seed.map(|s| s.wrapping_add(*idx as u64)));
            let files = job_histo_files(dir, fraction, &mut rng)
                .with_context(|| format!("sampling job histograms in {}", dir.display()))?;
            if files.is_empty() {
                tracing::warn!("no job histogram files selected in {}", dir.display());
                ledger.record(dir, Outcome::Skipped(SkipReason::NoArtifact));
                if let Some(pb) = &pb { pb.inc(1); }
                return Ok(());
            }
            let mut copied_any = false;
            for src in &files {
                let rel = relative_to_anchor(src, &token)?;
                let dest = dest_root.join(rel);
                let out = replicate_file(src, &dest, force, dry_run)?;
                copied_any |= out != CopyOutcome::SkippedExisting;
            }
            let outcome = if copied_any {
                Outcome::Success
            } else {
                Outcome::Skipped(SkipReason::AlreadyExists)
            };
            ledger.record(dir, outcome);
            if let Some(pb) = &pb { pb.inc(1); }
            Ok(())
        })?;

        if let Some(pb) = pb {
            pb.finish_with_message("done");
        }
        self.finalize(ledger, StopReason::Exhausted)
    }

    /// Run the external sampling computation over each dataset that does not
    /// yet hold an aggregate artifact, stopping once `max_datasets` have
    /// succeeded. Datasets are admitted in waves of at most
    /// `min(unit_concurrency, quota remaining)`, so the success count can
    /// never overshoot the quota and in-flight datasets always finish.
    pub fn sample_datasets<S: HistoSampler>(self, sampler: &S) -> Result<RunSummary> {
        init_tracing_once();
        let datasets = self.resolve_and_discover()?;

        let pb = if self.opts.progress {
            Some(make_count_progress(
                datasets.len() as u64,
                self.opts.progress_label.as_deref().unwrap_or("Sample datasets"),
            ))
        } else {
            None
        };

        let quota = QuotaController::new(self.opts.max_datasets);
        let ledger = RunLedger::new();
        let (fraction, dry_run) = (self.opts.sample_fraction, self.opts.dry_run);

        let mut next = 0usize;
        let mut stop = StopReason::Exhausted;
        while next < datasets.len() {
            if quota.reached() {
                tracing::info!("quota reached: {} dataset(s) sampled", quota.done());
                stop = StopReason::QuotaReached;
                break;
            }
            let take = quota
                .remaining()
                .min(self.opts.unit_concurrency)
                .min(datasets.len() - next);
            let wave = &datasets[next..next + take];

            let process = |dir: &PathBuf| -> Result<()> {
                let outcome = sample_one_dataset(dir, sampler, fraction, dry_run)?;
                if outcome == Outcome::Success {
                    quota.record_success();
                }
                ledger.record(dir, outcome);
                if let Some(pb) = &pb { pb.inc(1); }
                Ok(())
            };

            if take <= 1 {
                process(&wave[0])?;
            } else {
                wave.par_iter().try_for_each(process)?;
            }
            next += take;
        }

        if let Some(pb) = pb {
            pb.finish_with_message("done");
        }
        self.finalize(ledger, stop)
    }
}

impl Default for HistoSync {
    fn default() -> Self {
        Self::new()
    }
}

/// Process one dataset in sample-and-compute mode. A pre-existing aggregate
/// artifact means the dataset was already processed; it is skipped and never
/// charged against the quota. Sampler failures other than "no input" abort
/// the run.
fn sample_one_dataset<S: HistoSampler>(
    dir: &Path,
    sampler: &S,
    fraction: f64,
    dry_run: bool,
) -> Result<Outcome> {
    if has_dataset_artifact(dir) {
        tracing::info!("skip (already processed): {}", dir.display());
        return Ok(Outcome::Skipped(SkipReason::AlreadyProcessed));
    }
    if dry_run {
        tracing::info!("dryrun: would sample {:.1}% of {}", fraction * 100.0, dir.display());
        return Ok(Outcome::Success);
    }
    match sampler.sample(dir, fraction, dir) {
        Ok(()) => {
            tracing::info!("sampled {}", dir.display());
            Ok(Outcome::Success)
        }
        Err(crate::errors::SampleFailure::NoInput(path)) => {
            tracing::warn!("skip (no histogram inputs): {}", path.display());
            Ok(Outcome::Skipped(SkipReason::NoInput))
        }
        Err(crate::errors::SampleFailure::Failed(e)) => {
            Err(e).with_context(|| format!("sampling computation failed for {}", dir.display()))
        }
    }
}
