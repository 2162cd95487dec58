//! One run: find bundles, assemble the dataset, write it out.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sift_config::SiftConfig;
use sift_social::twitter::{write_dataset, DatasetAssembler};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub files_found: usize,
    pub files_failed: usize,
    pub posts_written: usize,
    pub duplicates_skipped: usize,
    pub output_path: PathBuf,
}

/// `*.json` files directly under `dir`, in filename order.
pub fn discover_bundles(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read input directory {}", dir.display()))?;

    let mut bundles = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to list input directory {}", dir.display()))?
            .path();
        if path.extension().is_some_and(|ext| ext == "json") && path.is_file() {
            bundles.push(path);
        }
    }
    bundles.sort();
    Ok(bundles)
}

pub fn run(cfg: &SiftConfig) -> Result<RunSummary> {
    let mut bundles = discover_bundles(&cfg.input_dir)?;

    // A previous output written into the input directory is not a bundle.
    if let Ok(output) = fs::canonicalize(&cfg.output_path) {
        bundles.retain(|b| fs::canonicalize(b).map_or(true, |b| b != output));
    }

    if bundles.is_empty() {
        warn!(dir = %cfg.input_dir.display(), "pipeline.no_bundles");
    }
    info!(count = bundles.len(), dir = %cfg.input_dir.display(), "pipeline.bundles_found");

    let dataset = DatasetAssembler::assemble(&bundles);

    write_dataset(&cfg.output_path, &dataset.posts)
        .with_context(|| format!("failed to write {}", cfg.output_path.display()))?;

    Ok(RunSummary {
        files_found: bundles.len(),
        files_failed: dataset.failures.len(),
        posts_written: dataset.posts.len(),
        duplicates_skipped: dataset.duplicates_skipped(),
        output_path: cfg.output_path.clone(),
    })
}
