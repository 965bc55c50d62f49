//! Batch MDL operations
//!
//! This module provides model discovery and parallel loading. Every load
//! owns its own buffers and cursors; only the progress counters are shared.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::debug;
use walkdir::WalkDir;

use crate::formats::mdl::{LoadOptions, Model, read_mdl_with_options};

/// Progress information during a batch load
#[derive(Debug, Clone)]
pub struct LoadProgress {
    /// Current item number (1-indexed)
    pub current: usize,
    /// Total number of items
    pub total: usize,
    /// File being loaded (if applicable)
    pub current_file: Option<String>,
}

impl LoadProgress {
    #[must_use]
    pub fn new(current: usize, total: usize) -> Self {
        Self {
            current,
            total,
            current_file: None,
        }
    }

    #[must_use]
    pub fn with_file(current: usize, total: usize, file: impl Into<String>) -> Self {
        Self {
            current,
            total,
            current_file: Some(file.into()),
        }
    }

    /// Get the progress percentage (0.0 - 1.0)
    #[must_use]
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.current as f32 / self.total as f32
        }
    }
}

/// Result of a batch load
#[derive(Debug, Clone)]
pub struct BatchLoadResult {
    /// Number of models decoded
    pub success_count: usize,
    /// Number of files that failed to decode
    pub fail_count: usize,
    /// Decoded models, in input order
    pub models: Vec<(PathBuf, Model)>,
    /// Failed files with their error message, in input order
    pub failures: Vec<(PathBuf, String)>,
}

/// Find all .mdl files in a directory recursively
///
/// # Returns
/// A sorted list of paths to .mdl files found in the directory tree.
pub fn find_mdl_files<P: AsRef<Path>>(dir: P) -> Vec<PathBuf> {
    let mut mdl_files: Vec<_> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| {
            e.path().is_file()
                && e.path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("mdl"))
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    mdl_files.sort();
    mdl_files
}

/// Load MDL files in parallel
///
/// A failing file does not stop the batch; its error is collected in
/// [`BatchLoadResult::failures`].
pub fn load_models<F>(paths: &[PathBuf], options: &LoadOptions, progress: F) -> BatchLoadResult
where
    F: Fn(&LoadProgress) + Send + Sync,
{
    let success_counter = AtomicUsize::new(0);
    let fail_counter = AtomicUsize::new(0);
    let processed = AtomicUsize::new(0);
    let total = paths.len();

    let outcomes: Vec<(PathBuf, Result<Model, String>)> = paths
        .par_iter()
        .map(|path| {
            let display_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();

            let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
            progress(&LoadProgress::with_file(current, total, display_name));

            match read_mdl_with_options(path, options) {
                Ok(model) => {
                    success_counter.fetch_add(1, Ordering::SeqCst);
                    (path.clone(), Ok(model))
                }
                Err(e) => {
                    debug!("Failed to load {}: {e}", path.display());
                    fail_counter.fetch_add(1, Ordering::SeqCst);
                    (path.clone(), Err(e.to_string()))
                }
            }
        })
        .collect();

    let mut models = Vec::new();
    let mut failures = Vec::new();
    for (path, outcome) in outcomes {
        match outcome {
            Ok(model) => models.push((path, model)),
            Err(message) => failures.push((path, message)),
        }
    }

    BatchLoadResult {
        success_count: success_counter.load(Ordering::SeqCst),
        fail_count: fail_counter.load(Ordering::SeqCst),
        models,
        failures,
    }
}
