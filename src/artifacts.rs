//! Intermediate artifact bookkeeping for one log file.

use crate::error::{PipelineError, Result};
use log::debug;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Tracks the intermediate files produced while processing one log.
///
/// Cleanup is all-or-nothing: a registered file missing at [`finalize`]
/// time means an upstream stage silently failed to produce its output, so
/// nothing is deleted and the missing paths are reported instead.
///
/// [`finalize`]: ArtifactSet::finalize
#[derive(Debug, Default)]
pub struct ArtifactSet {
    paths: BTreeSet<PathBuf>,
}

impl ArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a path as belonging to this set. Registering the same path
    /// twice has no additional effect.
    pub fn register<P: Into<PathBuf>>(&mut self, path: P) {
        self.paths.insert(path.into());
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn registered(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    /// Delete every registered file and clear the set, but only if all of
    /// them still exist; otherwise delete nothing and fail with
    /// [`PipelineError::IncompleteArtifacts`] naming the missing paths.
    pub fn finalize(&mut self) -> Result<()> {
        let missing: Vec<PathBuf> = self
            .paths
            .iter()
            .filter(|path| !path.exists())
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(PipelineError::IncompleteArtifacts(missing));
        }

        for path in &self.paths {
            fs::remove_file(path)?;
            debug!("removed intermediate {}", path.display());
        }
        self.paths.clear();
        Ok(())
    }
}
