use std::path::PathBuf;

use notify::Watcher;
use rustc_hash::FxHashSet;

use super::types::WatchTarget;

/// Keeps every watch target attached.
///
/// Targets missing at startup, or whose watch failed, are logged and
/// skipped; `maintain` attaches them once they appear and re-attaches roots
/// that were recreated.
pub(super) struct WatchRoots {
    desired: Vec<WatchTarget>,
    attached: FxHashSet<PathBuf>,
}

impl WatchRoots {
    pub(super) fn new(targets: Vec<WatchTarget>) -> Self {
        Self {
            desired: targets,
            attached: FxHashSet::default(),
        }
    }

    pub(super) fn targets(&self) -> &[WatchTarget] {
        &self.desired
    }

    pub(super) fn attach_existing(&mut self, watcher: &mut impl Watcher) {
        for target in &self.desired {
            if !target.path.exists() {
                crate::log!("watch"; "not found, skipping: {}", target.path.display());
            }

            let root = target.watch_root();
            if self.attached.contains(root) || !root.exists() {
                continue;
            }
            match watcher.watch(root, target.mode()) {
                Ok(()) => {
                    self.attached.insert(root.to_path_buf());
                }
                Err(e) => crate::log!("watch"; "failed to watch {}: {}", root.display(), e),
            }
        }
    }

    pub(super) fn maintain(&mut self, watcher: &mut impl Watcher) {
        self.attached.retain(|path| path.exists());

        for target in &self.desired {
            let root = target.watch_root();
            if self.attached.contains(root) || !root.exists() {
                continue;
            }

            if watcher.watch(root, target.mode()).is_ok() {
                self.attached.insert(root.to_path_buf());
                crate::log!("watch"; "watching: {}", target.path.display());
            }
        }
    }

    #[cfg(test)]
    pub(super) fn is_attached(&self, path: &std::path::Path) -> bool {
        self.attached.contains(path)
    }
}
