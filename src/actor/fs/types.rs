use std::path::{Path, PathBuf};

use notify::RecursiveMode;

/// A path the watcher is asked to track.
///
/// Directories are watched recursively. Files are watched through their
/// parent directory so editors that save by rename are still seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    pub path: PathBuf,
    pub is_file: bool,
}

impl WatchTarget {
    pub fn dir(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_file: false,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_file: true,
        }
    }

    /// Directory handed to notify.
    pub(super) fn watch_root(&self) -> &Path {
        if self.is_file {
            self.path.parent().unwrap_or(&self.path)
        } else {
            &self.path
        }
    }

    pub(super) fn mode(&self) -> RecursiveMode {
        if self.is_file {
            RecursiveMode::NonRecursive
        } else {
            RecursiveMode::Recursive
        }
    }

    /// Whether a changed path belongs to this target.
    pub(super) fn covers(&self, changed: &Path) -> bool {
        if self.is_file {
            changed == self.path
        } else {
            changed.starts_with(&self.path)
        }
    }
}
