//! Seam to the external histogram-sampling computation.
//!
//! The numerical aggregation itself lives outside this crate; all we require
//! is the tagged contract below: given a dataset directory, a sampling
//! fraction, and a destination, either an artifact is produced or the
//! failure says *why* — "no input data" is recoverable, anything else is not.

use crate::errors::SampleFailure;
use anyhow::{anyhow, Context};
use std::path::Path;
use std::process::Command;

/// Exit code by which the external sampler signals "no histogram inputs
/// found" — a recoverable, per-dataset condition. Any other nonzero exit is
/// treated as fatal.
pub const NO_INPUT_EXIT: i32 = 66;

/// Artifact-producing collaborator invoked once per dataset.
pub trait HistoSampler: Sync {
    /// Sample `fraction` of the job histograms under `dataset_dir` and write
    /// the aggregate artifact into `dest_dir`.
    fn sample(&self, dataset_dir: &Path, fraction: f64, dest_dir: &Path)
        -> Result<(), SampleFailure>;
}

/// Production sampler: runs an external program as
/// `<program> <dataset_dir> --sample-percentage <fraction> --dest-dir <dest>`.
///
/// Classification is by exit code, not by matching stderr text:
/// 0 = artifact written, [`NO_INPUT_EXIT`] = nothing to sample.
#[derive(Clone, Debug)]
pub struct CommandSampler {
    program: String,
}

impl CommandSampler {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }
}

impl HistoSampler for CommandSampler {
    fn sample(
        &self,
        dataset_dir: &Path,
        fraction: f64,
        dest_dir: &Path,
    ) -> Result<(), SampleFailure> {
        let status = Command::new(&self.program)
            .arg(dataset_dir)
            .arg("--sample-percentage")
            .arg(fraction.to_string())
            .arg("--dest-dir")
            .arg(dest_dir)
            .status()
            .with_context(|| format!("spawning sampler '{}'", self.program))
            .map_err(SampleFailure::Failed)?;

        match status.code() {
            Some(0) => Ok(()),
            Some(code) if code == NO_INPUT_EXIT => {
                Err(SampleFailure::NoInput(dataset_dir.to_path_buf()))
            }
            Some(code) => Err(SampleFailure::Failed(anyhow!(
                "sampler '{}' exited with code {} for {}",
                self.program,
                code,
                dataset_dir.display()
            ))),
            None => Err(SampleFailure::Failed(anyhow!(
                "sampler '{}' killed by signal for {}",
                self.program,
                dataset_dir.display()
            ))),
        }
    }
}
