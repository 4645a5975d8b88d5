use std::path::{Path, PathBuf};

/// Path segment that pivots the hierarchy: destination layout and dataset
/// depth are both measured from the last occurrence of this segment.
pub const DEFAULT_ANCHOR_TOKEN: &str = "sim";

/// Segments from the anchor token down to a dataset directory in the
/// canonical tree shape (`sim/<site>/<year>/<tier>/<generator>/<dataset>`).
pub const DEFAULT_ANCHOR_DISTANCE: usize = 5;

/// Dataset-level aggregate artifact suffix (one file per dataset).
pub const DATASET_ARTIFACT_SUFFIX: &str = ".histo.hdf5";

/// Marker subdirectory holding per-job intermediate histograms.
pub const JOB_MARKER_DIR: &str = "histos";

/// Per-job intermediate artifact suffix.
pub const JOB_ARTIFACT_SUFFIX: &str = ".pkl";

/// User-facing options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct SyncOptions {
    pub base_dir: PathBuf,
    pub anchor_token: String,
    pub anchor_distance: usize,
    pub sample_fraction: f64,      // in [0, 1]
    pub max_datasets: usize,       // quota for sample-and-compute runs
    pub force: bool,               // overwrite existing destination artifacts
    pub dry_run: bool,             // select and log, but never mutate
    pub seed: Option<u64>,         // Some(s) for reproducible selection
    pub unit_concurrency: usize,   // datasets processed concurrently
    pub progress: bool,            // show progress bar
    pub progress_label: Option<String>,
    pub summary_json: Option<PathBuf>, // write the run report here
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("/data/sim"),
            anchor_token: DEFAULT_ANCHOR_TOKEN.to_string(),
            anchor_distance: DEFAULT_ANCHOR_DISTANCE,
            sample_fraction: 1.0,
            max_datasets: usize::MAX,
            force: false,
            dry_run: false,
            seed: None,
            unit_concurrency: 1, // safe default: fully sequential unit I/O
            progress: true,
            progress_label: None,
            summary_json: None,
        }
    }
}

impl SyncOptions {
    pub fn with_base_dir(mut self, base: impl AsRef<Path>) -> Self {
        self.base_dir = base.as_ref().to_path_buf();
        self
    }
    pub fn with_anchor_token(mut self, token: impl AsRef<str>) -> Self {
        self.anchor_token = token.as_ref().trim_matches('/').to_string();
        self
    }
    pub fn with_anchor_distance(mut self, segments: usize) -> Self {
        self.anchor_distance = segments;
        self
    }
    pub fn with_sample_fraction(mut self, fraction: f64) -> Self {
        self.sample_fraction = fraction.clamp(0.0, 1.0);
        self
    }
    pub fn with_max_datasets(mut self, max: usize) -> Self {
        self.max_datasets = max;
        self
    }
    pub fn with_force(mut self, yes: bool) -> Self {
        self.force = yes;
        self
    }
    pub fn with_dry_run(mut self, yes: bool) -> Self {
        self.dry_run = yes;
        self
    }
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
    pub fn with_unit_concurrency(mut self, n: usize) -> Self {
        self.unit_concurrency = n.max(1);
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_progress_label(mut self, label: impl Into<String>) -> Self {
        self.progress_label = Some(label.into());
        self
    }
    pub fn with_summary_json(mut self, path: impl AsRef<Path>) -> Self {
        self.summary_json = Some(path.as_ref().to_path_buf());
        self
    }
}
