use crate::config::JOB_MARKER_DIR;
use anyhow::{anyhow, Context, Result};
use regex::Regex;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

fn dataset_artifact_re() -> Regex {
    Regex::new(r"\.histo\.hdf5$").unwrap()
}

fn job_artifact_re() -> Regex {
    Regex::new(r"\.pkl$").unwrap()
}

/// List all directories at exactly `depth` levels below `base`, sorted
/// lexicographically. Depth 0 yields `base` itself.
///
/// The sort is deliberate: quota-based early termination makes selection
/// order observable, so the traversal order is pinned rather than inherited
/// from the platform's readdir order. Unreadable subdirectories are skipped
/// with a warning; an unreadable `base` is a hard error.
pub fn discover_datasets(base: &Path, depth: usize) -> Result<Vec<PathBuf>> {
    if !base.is_dir() {
        return Err(anyhow!("base path is not a directory: {}", base.display()));
    }
    // An unreadable base is fatal; unreadable subtrees below it are not.
    std::fs::read_dir(base).with_context(|| format!("reading base path {}", base.display()))?;
    if depth == 0 {
        return Ok(vec![base.to_path_buf()]);
    }

    let mut dirs = Vec::new();
    for entry in WalkDir::new(base).min_depth(depth).max_depth(depth) {
        match entry {
            Ok(ent) if ent.file_type().is_dir() => dirs.push(ent.path().to_path_buf()),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("skipping unreadable entry under {}: {}", base.display(), e);
            }
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Dataset-level aggregate artifacts (`*.histo.hdf5`) directly inside `dir`,
/// sorted. Does not recurse.
pub fn dataset_artifacts(dir: &Path) -> Result<Vec<PathBuf>> {
    let re = dataset_artifact_re();
    list_matching_files(dir, &re)
}

/// True when `dir` already holds a dataset-level aggregate artifact, which is
/// taken as evidence of prior processing.
pub fn has_dataset_artifact(dir: &Path) -> bool {
    dataset_artifacts(dir).map(|v| !v.is_empty()).unwrap_or(false)
}

/// Per-job `histos` marker directories: `<dataset>/<job>/histos`, sorted.
pub fn job_marker_dirs(dataset_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in WalkDir::new(dataset_dir).min_depth(2).max_depth(2) {
        if let Ok(ent) = entry {
            if ent.file_type().is_dir() && ent.file_name() == JOB_MARKER_DIR {
                dirs.push(ent.path().to_path_buf());
            }
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Per-job intermediate artifacts (`*.pkl`) directly inside one marker
/// directory, sorted.
pub fn job_artifacts(marker_dir: &Path) -> Result<Vec<PathBuf>> {
    let re = job_artifact_re();
    list_matching_files(marker_dir, &re)
}

fn list_matching_files(dir: &Path, re: &Regex) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let ent = entry.with_context(|| format!("reading {}", dir.display()))?;
        if !ent.file_type().is_file() {
            continue;
        }
        if let Some(name) = ent.file_name().to_str() {
            if re.is_match(name) {
                files.push(ent.path().to_path_buf());
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Path of `path` relative to the LAST occurrence of the anchor `token`,
/// token included. This is the stable pivot for destination layout: the
/// mirrored tree is always rooted at the token no matter how deep the
/// caller's base path started.
///
/// `/data/sim/IceCube/2023/a.hdf5` with token `sim` yields
/// `sim/IceCube/2023/a.hdf5`.
pub fn relative_to_anchor(path: &Path, token: &str) -> Result<PathBuf> {
    let comps: Vec<Component> = path.components().collect();
    let anchor_idx = comps
        .iter()
        .rposition(|c| matches!(c, Component::Normal(s) if s.to_str() == Some(token)))
        .ok_or_else(|| anyhow!("anchor segment '{}' not found in {}", token, path.display()))?;
    Ok(comps[anchor_idx..].iter().collect())
}
