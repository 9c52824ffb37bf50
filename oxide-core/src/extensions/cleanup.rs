//! Deferred removal of stale module files

use std::path::{Path, PathBuf};

/// Files queued for deletion.
///
/// Discovery queues stale modules here instead of deleting them while the
/// directory is being scanned.
#[derive(Debug, Default)]
pub struct CleanupQueue {
    paths: Vec<PathBuf>,
}

impl CleanupQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a path; a path already queued is not added twice
    pub fn add(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Delete every queued file and drain the queue.
    ///
    /// Returns the number of files removed. Files that are already gone count
    /// as removed; other failures are logged.
    pub fn run(&mut self) -> usize {
        let mut removed = 0;
        for path in self.paths.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "Removed stale module");
                    removed += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => removed += 1,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to remove stale module");
                }
            }
        }
        removed
    }
}
