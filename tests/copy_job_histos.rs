#[path = "common/mod.rs"]
mod common;

use common::*;
use histosync::{HistoSync, Outcome, SkipReason};

fn sync_for(base: &std::path::Path) -> HistoSync {
    HistoSync::new().base_dir(base).progress(false)
}

/// Fraction 1.0 mirrors every per-job histogram file, anchor-relative.
#[test]
fn full_fraction_mirrors_all_job_files() {
    let sim = make_sim_root();
    let ds = make_dataset(&sim, "nugen", "22645");
    add_job_histos(&ds, "job1", 3);
    add_job_histos(&ds, "job2", 2);

    let dest = tempfile::tempdir().unwrap().into_path();
    let summary = sync_for(&sim)
        .sample_fraction(1.0)
        .copy_job_histos(&dest)
        .unwrap();

    assert_eq!(summary.succeeded, 1);
    let mirrored = relative_files(&dest);
    assert_eq!(mirrored.len(), 5);
    assert!(mirrored.iter().all(|p| p.starts_with("sim/IceCube/2023/generated/nugen/22645")));
    assert!(dest
        .join("sim/IceCube/2023/generated/nugen/22645/job1/histos/histo_0.pkl")
        .exists());
}

/// Fraction 0 selects nothing: the dataset is skipped and the destination
/// stays empty.
#[test]
fn zero_fraction_copies_nothing() {
    let sim = make_sim_root();
    let ds = make_dataset(&sim, "nugen", "22645");
    add_job_histos(&ds, "job1", 4);

    let dest = tempfile::tempdir().unwrap().into_path();
    let summary = sync_for(&sim)
        .sample_fraction(0.0)
        .copy_job_histos(&dest)
        .unwrap();

    assert_eq!(summary.succeeded, 0);
    assert_eq!(
        summary.reports[0].outcome,
        Outcome::Skipped(SkipReason::NoArtifact)
    );
    assert!(relative_files(&dest).is_empty());
}

/// A fixed seed reproduces the same selection across runs.
#[test]
fn seeded_selection_is_reproducible() {
    let sim = make_sim_root();
    let ds = make_dataset(&sim, "nugen", "22645");
    add_job_histos(&ds, "job1", 10);
    add_job_histos(&ds, "job2", 10);

    let dest_a = tempfile::tempdir().unwrap().into_path();
    let dest_b = tempfile::tempdir().unwrap().into_path();

    sync_for(&sim).sample_fraction(0.5).seed(42).copy_job_histos(&dest_a).unwrap();
    sync_for(&sim).sample_fraction(0.5).seed(42).copy_job_histos(&dest_b).unwrap();

    let files_a = relative_files(&dest_a);
    assert!(!files_a.is_empty());
    assert_eq!(files_a, relative_files(&dest_b));
}

/// Re-running without force skips every already-mirrored file.
#[test]
fn rerun_skips_existing_files() {
    let sim = make_sim_root();
    let ds = make_dataset(&sim, "nugen", "22645");
    add_job_histos(&ds, "job1", 4);

    let dest = tempfile::tempdir().unwrap().into_path();
    sync_for(&sim).sample_fraction(1.0).copy_job_histos(&dest).unwrap();
    let second = sync_for(&sim).sample_fraction(1.0).copy_job_histos(&dest).unwrap();

    assert_eq!(second.succeeded, 0);
    assert_eq!(
        second.reports[0].outcome,
        Outcome::Skipped(SkipReason::AlreadyExists)
    );
}

/// Dry run performs selection but leaves the destination untouched.
#[test]
fn dry_run_leaves_destination_untouched() {
    let sim = make_sim_root();
    let ds = make_dataset(&sim, "nugen", "22645");
    add_job_histos(&ds, "job1", 6);

    let dest = tempfile::tempdir().unwrap().into_path().join("mirror");
    let summary = sync_for(&sim)
        .sample_fraction(0.5)
        .dry_run(true)
        .copy_job_histos(&dest)
        .unwrap();

    assert_eq!(summary.succeeded, 1);
    assert!(!dest.exists());
}
