//! Typed errors for the two boundaries where callers need to branch on the
//! failure kind rather than just report it.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while resolving the dataset depth from an anchor path.
#[derive(Debug, Error)]
pub enum DepthError {
    /// The supplied path does not contain the anchor segment anywhere in its
    /// ancestry, so there is no pivot to measure from.
    #[error("anchor segment '{token}' not found in path {path}")]
    AnchorNotFound { token: String, path: PathBuf },

    /// The supplied path is already deeper than the dataset level: the caller
    /// pointed inside a dataset (or below), which has no sensible enumeration.
    #[error(
        "path {path} is {excess} segment(s) below the dataset level \
         (anchor '{token}' sits {distance} segments above datasets)"
    )]
    PathTooSpecific {
        token: String,
        path: PathBuf,
        distance: usize,
        excess: usize,
    },
}

/// Tagged result of the external histogram-sampling computation.
///
/// "No input" is a recoverable per-dataset condition (the dataset simply has
/// no job histograms yet); everything else aborts the run.
#[derive(Debug, Error)]
pub enum SampleFailure {
    #[error("no histogram inputs under {0}")]
    NoInput(PathBuf),

    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}
