//! Scratch directory lifecycle.
//!
//! Clones contain read-only files (git packs on Windows, for instance), so
//! removal clears the read-only attribute and retries once before giving up.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Removes a directory tree, tolerating read-only entries.
///
/// A missing directory is not an error.
pub(crate) fn remove_dir_robust(path: &Path) -> io::Result<()> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Retrying removal after clearing read-only flags");
            clear_readonly(path);
            match std::fs::remove_dir_all(path) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            }
        }
    }
}

#[allow(clippy::permissions_set_readonly_false)]
fn clear_readonly(path: &Path) {
    for entry in WalkDir::new(path).into_iter().filter_map(Result::ok) {
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        let mut permissions = metadata.permissions();
        if permissions.readonly() {
            permissions.set_readonly(false);
            let _ = std::fs::set_permissions(entry.path(), permissions);
        }
    }
}

/// Removes and recreates a directory.
pub(crate) fn reset_dir(path: &Path) -> io::Result<()> {
    remove_dir_robust(path)?;
    std::fs::create_dir_all(path)
}

/// Removes its directories when dropped, on every exit path.
///
/// Removal failures are logged and otherwise ignored.
#[derive(Debug)]
pub(crate) struct ScratchGuard {
    paths: Vec<PathBuf>,
}

impl ScratchGuard {
    pub(crate) fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            paths: paths.into_iter().collect(),
        }
    }
}

impl Drop for ScratchGuard {
    fn drop(&mut self) {
        for path in &self.paths {
            if !path.exists() {
                continue;
            }
            debug!(path = %path.display(), "Cleaning up");
            if let Err(e) = remove_dir_robust(path) {
                warn!(path = %path.display(), error = %e, "Could not remove scratch directory");
            }
        }
    }
}
