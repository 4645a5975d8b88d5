use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Build an empty simulation tree root and return `<tmp>/data/sim`.
/// The layout below `sim` follows the canonical shape:
/// `sim/<site>/<year>/<tier>/<generator>/<dataset>`.
pub fn make_sim_root() -> PathBuf {
    let dir = tempfile::tempdir().unwrap();
    let sim = dir.into_path().join("data").join("sim");
    fs::create_dir_all(&sim).unwrap();
    sim
}

/// Create one dataset directory five segments below `sim`.
pub fn make_dataset(sim: &Path, generator: &str, name: &str) -> PathBuf {
    let ds = sim
        .join("IceCube")
        .join("2023")
        .join("generated")
        .join(generator)
        .join(name);
    fs::create_dir_all(&ds).unwrap();
    ds
}

pub fn write_file(path: &Path, content: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut f = File::create(path).unwrap();
    f.write_all(content).unwrap();
}

/// Place a dataset-level aggregate artifact (`<name>.histo.hdf5`) directly
/// inside the dataset directory.
pub fn add_dataset_artifact(dataset: &Path, content: &[u8]) -> PathBuf {
    let name = dataset.file_name().unwrap().to_string_lossy();
    let artifact = dataset.join(format!("{name}.histo.hdf5"));
    write_file(&artifact, content);
    artifact
}

/// Create `count` per-job histogram files under `<dataset>/<job>/histos/`.
pub fn add_job_histos(dataset: &Path, job: &str, count: usize) -> Vec<PathBuf> {
    let marker = dataset.join(job).join("histos");
    fs::create_dir_all(&marker).unwrap();
    (0..count)
        .map(|i| {
            let p = marker.join(format!("histo_{i}.pkl"));
            write_file(&p, format!("histo {i}").as_bytes());
            p
        })
        .collect()
}

/// All files below `root`, as paths relative to it, sorted. Handy for
/// comparing mirrored trees.
pub fn relative_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    if !root.exists() {
        return out;
    }
    for entry in walkdir::WalkDir::new(root) {
        let ent = entry.unwrap();
        if ent.file_type().is_file() {
            out.push(ent.path().strip_prefix(root).unwrap().to_path_buf());
        }
    }
    out.sort();
    out
}
