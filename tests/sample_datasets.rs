#[path = "common/mod.rs"]
mod common;

use anyhow::anyhow;
use common::*;
use histosync::{HistoSampler, HistoSync, Outcome, SampleFailure, SkipReason, StopReason};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Test double for the external sampling computation: records every call,
/// writes the aggregate artifact on success, and can be told to report
/// "no input" or fail outright for specific datasets.
#[derive(Default)]
struct MockSampler {
    calls: Mutex<Vec<PathBuf>>,
    no_input: Vec<PathBuf>,
    fail_on: Option<PathBuf>,
}

impl MockSampler {
    fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

impl HistoSampler for MockSampler {
    fn sample(&self, dataset_dir: &Path, _fraction: f64, dest_dir: &Path) -> Result<(), SampleFailure> {
        self.calls.lock().unwrap().push(dataset_dir.to_path_buf());
        if self.fail_on.as_deref() == Some(dataset_dir) {
            return Err(SampleFailure::Failed(anyhow!("corrupt histogram input")));
        }
        if self.no_input.iter().any(|p| p == dataset_dir) {
            return Err(SampleFailure::NoInput(dataset_dir.to_path_buf()));
        }
        let name = dataset_dir.file_name().unwrap().to_string_lossy();
        File::create(dest_dir.join(format!("{name}.histo.hdf5"))).unwrap();
        Ok(())
    }
}

fn sync_for(base: &Path) -> HistoSync {
    HistoSync::new().base_dir(base).progress(false).sample_fraction(0.5)
}

/// Quota law: with more datasets than quota, exactly `max` succeed and the
/// run stops benignly.
#[test]
fn quota_caps_successes() {
    let sim = make_sim_root();
    for name in ["22645", "22646", "22647", "22648", "22649"] {
        make_dataset(&sim, "nugen", name);
    }

    let sampler = MockSampler::default();
    let summary = sync_for(&sim).max_datasets(3).sample_datasets(&sampler).unwrap();

    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.stop, StopReason::QuotaReached);
    // Sorted admission: the three lowest dataset ids were processed.
    let calls = sampler.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|p| {
        let n = p.file_name().unwrap().to_string_lossy().to_string();
        ["22645", "22646", "22647"].contains(&n.as_str())
    }));
}

/// Fewer datasets than quota: all are attempted and the run still exits
/// cleanly.
#[test]
fn quota_larger_than_population_exhausts() {
    let sim = make_sim_root();
    make_dataset(&sim, "nugen", "22645");
    make_dataset(&sim, "nugen", "22646");

    let sampler = MockSampler::default();
    let summary = sync_for(&sim).max_datasets(5).sample_datasets(&sampler).unwrap();

    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.stop, StopReason::Exhausted);
}

/// Datasets already holding an aggregate artifact are skipped without ever
/// invoking the sampler, and never count toward the quota.
#[test]
fn prepopulated_datasets_are_skipped() {
    let sim = make_sim_root();
    let a = make_dataset(&sim, "nugen", "22645");
    let b = make_dataset(&sim, "nugen", "22646");
    let c = make_dataset(&sim, "nugen", "22647");
    add_dataset_artifact(&a, b"done");
    add_dataset_artifact(&b, b"done");

    let sampler = MockSampler::default();
    let summary = sync_for(&sim).max_datasets(5).sample_datasets(&sampler).unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(
        summary
            .reports
            .iter()
            .filter(|r| r.outcome == Outcome::Skipped(SkipReason::AlreadyProcessed))
            .count(),
        2
    );
    assert_eq!(sampler.calls(), vec![c.clone()]);
    assert!(c.join("22647.histo.hdf5").exists());
}

/// "No input" is recoverable: the dataset is skipped, the loop continues,
/// and the quota is not charged.
#[test]
fn no_input_does_not_consume_quota() {
    let sim = make_sim_root();
    let a = make_dataset(&sim, "nugen", "22645");
    make_dataset(&sim, "nugen", "22646");
    make_dataset(&sim, "nugen", "22647");

    let sampler = MockSampler { no_input: vec![a], ..Default::default() };
    let summary = sync_for(&sim).max_datasets(1).sample_datasets(&sampler).unwrap();

    // First dataset reported NoInput, second succeeded, quota then reached:
    // the third was never admitted.
    assert_eq!(sampler.calls().len(), 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.stop, StopReason::QuotaReached);
}

/// Any other sampler failure aborts the run; datasets after it are never
/// attempted.
#[test]
fn fatal_failure_aborts_run() {
    let sim = make_sim_root();
    let a = make_dataset(&sim, "nugen", "22645");
    make_dataset(&sim, "nugen", "22646");
    make_dataset(&sim, "nugen", "22647");

    let sampler = MockSampler { fail_on: Some(a), ..Default::default() };
    let err = sync_for(&sim).max_datasets(5).sample_datasets(&sampler).unwrap_err();

    assert!(format!("{err:#}").contains("corrupt histogram input"));
    assert_eq!(sampler.calls().len(), 1);
}

/// Dry run admits datasets through the same quota gate but never invokes
/// the sampler and writes nothing.
#[test]
fn dry_run_never_invokes_sampler() {
    let sim = make_sim_root();
    let a = make_dataset(&sim, "nugen", "22645");
    make_dataset(&sim, "nugen", "22646");

    let sampler = MockSampler::default();
    let summary = sync_for(&sim)
        .max_datasets(1)
        .dry_run(true)
        .sample_datasets(&sampler)
        .unwrap();

    assert!(sampler.calls().is_empty());
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.stop, StopReason::QuotaReached);
    assert!(!a.join("22645.histo.hdf5").exists());
}

/// Quota of zero admits nothing at all.
#[test]
fn zero_quota_admits_nothing() {
    let sim = make_sim_root();
    make_dataset(&sim, "nugen", "22645");

    let sampler = MockSampler::default();
    let summary = sync_for(&sim).max_datasets(0).sample_datasets(&sampler).unwrap();

    assert!(sampler.calls().is_empty());
    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.stop, StopReason::QuotaReached);
}

/// Under a worker pool the synchronized counter still lands exactly on the
/// quota: no overshoot, no lost increment.
#[test]
fn parallel_run_respects_quota() {
    let sim = make_sim_root();
    for i in 0..8 {
        make_dataset(&sim, "nugen", &format!("226{i:02}"));
    }

    let sampler = MockSampler::default();
    let summary = sync_for(&sim)
        .max_datasets(3)
        .unit_concurrency(4)
        .sample_datasets(&sampler)
        .unwrap();

    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.stop, StopReason::QuotaReached);
    assert_eq!(sampler.calls().len(), 3);
}

/// With no quota pressure, a parallel run processes every dataset and
/// records every outcome.
#[test]
fn parallel_run_processes_all() {
    let sim = make_sim_root();
    for i in 0..8 {
        make_dataset(&sim, "nugen", &format!("226{i:02}"));
    }

    let sampler = MockSampler::default();
    let summary = sync_for(&sim)
        .max_datasets(100)
        .unit_concurrency(4)
        .sample_datasets(&sampler)
        .unwrap();

    assert_eq!(summary.succeeded, 8);
    assert_eq!(summary.reports.len(), 8);
    assert_eq!(summary.stop, StopReason::Exhausted);
}
