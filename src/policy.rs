//! Per-file replication policy: skip, overwrite, or write fresh.
//!
//! The decision is always per file, never per directory — partial overwrite
//! within one dataset is valid and expected.

use crate::util::{copy_with_backoff, remove_with_backoff, replace_file_atomic_backoff};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const COPY_TRIES: usize = 20;
const COPY_DELAY_MS: u64 = 50;

/// What happened to one destination file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Destination did not exist; written fresh.
    Copied,
    /// Destination existed and force was set; replaced.
    Overwritten,
    /// Destination existed and force was not set; left untouched.
    SkippedExisting,
}

/// Apply the replication policy for one `src -> dest` pair.
///
/// Fresh writes copy directly. Overwrites go through a sibling `.tmp` file
/// and an atomic replace so an interrupted run never leaves a truncated
/// artifact at the destination. Dry-run makes the same decision and logs it
/// but touches nothing (no parent directories either).
pub fn replicate_file(src: &Path, dest: &Path, force: bool, dry_run: bool) -> Result<CopyOutcome> {
    let exists = dest.exists();

    if exists && !force {
        tracing::info!("skip (exists): {}", dest.display());
        return Ok(CopyOutcome::SkippedExisting);
    }

    if dry_run {
        if exists {
            tracing::info!("dryrun: would overwrite {}", dest.display());
            return Ok(CopyOutcome::Overwritten);
        }
        tracing::info!("dryrun: would copy {} -> {}", src.display(), dest.display());
        return Ok(CopyOutcome::Copied);
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating destination dir {}", parent.display()))?;
    }

    if exists {
        let mut tmp_name = dest
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        tmp_name.push(".tmp");
        let tmp = dest.with_file_name(tmp_name);
        copy_with_backoff(src, &tmp, COPY_TRIES, COPY_DELAY_MS)?;
        if let Err(e) = replace_file_atomic_backoff(&tmp, dest) {
            let _ = remove_with_backoff(&tmp, 1, 0);
            return Err(e);
        }
        tracing::info!("overwrote {}", dest.display());
        return Ok(CopyOutcome::Overwritten);
    }

    copy_with_backoff(src, dest, COPY_TRIES, COPY_DELAY_MS)?;
    tracing::info!("copied {} -> {}", src.display(), dest.display());
    Ok(CopyOutcome::Copied)
}
