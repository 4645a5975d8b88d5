mod concurrency;
mod config;
mod depth;
mod errors;
mod outcome;
mod paths;
mod pipeline;
mod policy;
mod progress;
mod quota;
mod sample;
mod sampler;
mod util;

pub use crate::config::{
    SyncOptions, DATASET_ARTIFACT_SUFFIX, DEFAULT_ANCHOR_DISTANCE, DEFAULT_ANCHOR_TOKEN,
    JOB_ARTIFACT_SUFFIX, JOB_MARKER_DIR,
};
pub use crate::depth::resolve_depth;
pub use crate::errors::{DepthError, SampleFailure};
pub use crate::outcome::{Outcome, RunLedger, RunSummary, SkipReason, StopReason, UnitReport};
pub use crate::pipeline::HistoSync;
pub use crate::quota::QuotaController;

// Discovery and selection primitives, reusable from application code.
pub use crate::paths::{
    dataset_artifacts, discover_datasets, has_dataset_artifact, job_artifacts, job_marker_dirs,
    relative_to_anchor,
};
pub use crate::sample::{job_histo_files, sample_count, sample_items, selection_rng};

// The external-sampler seam and its production implementation.
pub use crate::sampler::{CommandSampler, HistoSampler, NO_INPUT_EXIT};

// Per-file replication policy, usable standalone.
pub use crate::policy::{replicate_file, CopyOutcome};

// Robust file ops and tracing setup for binaries.
pub use crate::util::{copy_with_backoff, init_tracing_once, replace_file_atomic_backoff};
