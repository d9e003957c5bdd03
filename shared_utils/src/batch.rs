//! Batch accounting and input resolution
//!
//! `BatchResult` is the running completed/failed/total tally of one batch,
//! `ProgressEvent` the snapshot published after every file.

use crate::errors::{Result, VidGifError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Expands a glob pattern into absolute file paths, in glob order (alphabetical).
///
/// Directories matched by the pattern are ignored. An unreadable path met while
/// walking is logged and skipped.
pub fn resolve_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob::glob(pattern).map_err(|e| VidGifError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.msg.to_string(),
    })?;

    let cwd = std::env::current_dir()?;
    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(absolutize(&cwd, path)),
            Ok(_) => {}
            Err(e) => warn!(path = %e.path().display(), error = %e.error(), "Skipping unreadable path"),
        }
    }
    Ok(files)
}

fn absolutize(cwd: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchResult {
    /// Files converted with success
    pub completed: usize,
    /// Files whose transcoder or encoder step failed
    pub failed: usize,
    /// Files resolved at batch start
    pub total: usize,
}

impl BatchResult {
    pub fn new(total: usize) -> Self {
        Self {
            completed: 0,
            failed: 0,
            total,
        }
    }

    pub fn success(&mut self) {
        debug_assert!(self.processed() < self.total);
        self.completed += 1;
    }

    pub fn fail(&mut self) {
        debug_assert!(self.processed() < self.total);
        self.failed += 1;
    }

    pub fn processed(&self) -> usize {
        self.completed + self.failed
    }

    pub fn is_finished(&self) -> bool {
        self.processed() == self.total
    }

    pub fn progress(&self) -> ProgressEvent {
        let percent = if self.total == 0 {
            100.0
        } else {
            self.processed() as f64 / self.total as f64 * 100.0
        };
        ProgressEvent {
            completed: self.completed,
            failed: self.failed,
            total: self.total,
            percent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub completed: usize,
    pub failed: usize,
    pub total: usize,
    /// `(completed + failed) / total * 100`
    pub percent: f64,
}
