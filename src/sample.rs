//! Uniform random subset selection with a single documented rounding rule.

use crate::paths::{job_artifacts, job_marker_dirs};
use anyhow::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

/// Number of items to draw from `total` at `fraction`: round-half-up of
/// `total * fraction`, clamped to `[0, total]`. Fraction 0 selects nothing;
/// that is a valid (empty) selection, not an error.
pub fn sample_count(total: usize, fraction: f64) -> usize {
    let f = fraction.clamp(0.0, 1.0);
    let k = (total as f64 * f + 0.5).floor() as usize;
    k.min(total)
}

/// Build the selection RNG: seeded for reproducible dry-run verification,
/// fresh entropy otherwise.
pub fn selection_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Draw a uniform subset without replacement, sized by [`sample_count`].
/// The returned items keep no particular order.
pub fn sample_items<T: Clone>(items: &[T], fraction: f64, rng: &mut StdRng) -> Vec<T> {
    let k = sample_count(items.len(), fraction);
    if k == 0 {
        return Vec::new();
    }
    items.choose_multiple(rng, k).cloned().collect()
}

/// Two-level sample of one dataset's per-job histogram files.
///
/// First draws a subset of the `histos` marker directories, then,
/// independently, a subset of the `*.pkl` files inside each selected marker
/// directory — each directory's file sample is computed from its own local
/// total, not from a single global pool. Returns the selected files sorted.
pub fn job_histo_files(dataset_dir: &Path, fraction: f64, rng: &mut StdRng) -> Result<Vec<PathBuf>> {
    let markers = job_marker_dirs(dataset_dir)?;
    let picked_markers = sample_items(&markers, fraction, rng);

    let mut files = Vec::new();
    for marker in &picked_markers {
        let local = job_artifacts(marker)?;
        files.extend(sample_items(&local, fraction, rng));
    }
    files.sort();
    Ok(files)
}
