//! FileSystem Actor
//!
//! Watches the source targets and sends one `BuildMsg::Rebuild` per
//! debounced batch to the BuildActor.
//!
//! ```text
//! Watcher → Debouncer (timing, dedup) → target filter → BuildMsg
//! ```

use std::time::Duration;

use notify::RecommendedWatcher;
use rustc_hash::FxHashMap;
use tokio::sync::mpsc;

use super::messages::{BuildMsg, Change, ChangeKind};

// Pure timing and deduplication.
mod debouncer;
// Shared fs types.
mod types;
// Watch root attach/re-attach lifecycle.
mod watch_roots;

#[cfg(test)]
mod tests;

pub use types::WatchTarget;

/// How often missing or recreated watch roots are re-checked
const MAINTAIN_INTERVAL: Duration = Duration::from_secs(1);

use debouncer::Debouncer;
use watch_roots::WatchRoots;

/// FileSystem Actor - watches for source changes
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    watch_roots: WatchRoots,
    build_tx: mpsc::Sender<BuildMsg>,
    debouncer: Debouncer,
}

impl FsActor {
    /// Start watching immediately.
    ///
    /// Events are buffered while the initial build runs, so nothing that
    /// changes during startup is lost.
    pub fn new(targets: Vec<WatchTarget>, build_tx: mpsc::Sender<BuildMsg>) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let mut watch_roots = WatchRoots::new(targets);
        watch_roots.attach_existing(&mut watcher);

        Ok(Self {
            notify_rx,
            watcher,
            watch_roots,
            build_tx,
            debouncer: Debouncer::new(),
        })
    }

    /// Run the actor event loop
    pub async fn run(self) {
        let notify_rx = self.notify_rx;
        let build_tx = self.build_tx;
        let mut debouncer = self.debouncer;
        let mut watcher = self.watcher;
        let mut watch_roots = self.watch_roots;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);
        let mut maintain = tokio::time::interval(MAINTAIN_INTERVAL);
        maintain.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // notify delivers on a std channel; bridge it into tokio
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                Some(event) = async_rx.recv() => debouncer.add_event(&event),
                _ = maintain.tick() => watch_roots.maintain(&mut watcher),
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    let Some(raw) = debouncer.take_if_ready() else { continue };
                    let changes = relevant_changes(raw, watch_roots.targets());
                    if changes.is_empty() {
                        continue;
                    }
                    log_changes(&changes);
                    if build_tx.send(BuildMsg::Rebuild { changes }).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

/// Keep changes under a watch target, sorted by path.
fn relevant_changes(raw: FxHashMap<std::path::PathBuf, ChangeKind>, targets: &[WatchTarget]) -> Vec<Change> {
    let mut changes: Vec<Change> = raw
        .into_iter()
        .filter(|(path, _)| targets.iter().any(|t| t.covers(path)))
        .collect();
    changes.sort_by(|a, b| a.0.cmp(&b.0));
    changes
}

fn log_changes(changes: &[Change]) {
    for (path, kind) in changes {
        crate::log!("watch"; "there are new changes in '{}'", path.display());
        crate::debug!("watch"; "{}: {}", kind.label(), path.display());
    }
}
