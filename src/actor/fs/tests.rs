use std::path::{Path, PathBuf};
use std::time::Duration;

use rustc_hash::FxHashMap;

use super::debouncer::{DEBOUNCE_MS, Debouncer, REBUILD_COOLDOWN_MS};
use super::watch_roots::WatchRoots;
use super::*;

fn make_event(paths: Vec<&str>, kind: notify::EventKind) -> notify::Event {
    notify::Event {
        kind,
        paths: paths.into_iter().map(PathBuf::from).collect(),
        attrs: Default::default(),
    }
}

fn modify_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Data(
        notify::event::DataChange::Any,
    ))
}

fn metadata_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Metadata(
        notify::event::MetadataKind::WriteTime,
    ))
}

fn create_kind() -> notify::EventKind {
    notify::EventKind::Create(notify::event::CreateKind::File)
}

fn remove_kind() -> notify::EventKind {
    notify::EventKind::Remove(notify::event::RemoveKind::File)
}

#[test]
fn test_debouncer_empty() {
    let debouncer = Debouncer::new();
    assert!(!debouncer.is_ready());
}

#[test]
fn test_event_kinds() {
    let mut debouncer = Debouncer::new();

    debouncer.add_event(&make_event(vec!["/p/crate/src/a.rs"], create_kind()));
    debouncer.add_event(&make_event(vec!["/p/crate/src/b.rs"], modify_kind()));
    debouncer.add_event(&make_event(vec!["/p/crate/src/c.rs"], remove_kind()));

    assert_eq!(debouncer.changes.len(), 3);
    assert_eq!(
        debouncer.changes[&PathBuf::from("/p/crate/src/a.rs")],
        ChangeKind::Created
    );
    assert_eq!(
        debouncer.changes[&PathBuf::from("/p/crate/src/c.rs")],
        ChangeKind::Removed
    );
}

#[test]
fn test_metadata_only_ignored() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/p/crate/src/lib.rs"], metadata_kind()));
    assert!(debouncer.changes.is_empty());
    assert!(debouncer.last_event.is_none());
}

#[test]
fn test_temp_files_ignored() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(
        vec![
            "/p/crate/src/.lib.rs.swp",
            "/p/crate/src/lib.rs~",
            "/p/crate/src/lib.rs.bk",
            "/p/crate/src/4913",
        ],
        modify_kind(),
    ));
    assert!(debouncer.changes.is_empty());
}

#[test]
fn test_dedup_first_event_wins() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/p/a.rs"], create_kind()));
    debouncer.add_event(&make_event(vec!["/p/a.rs", "/p/a.rs"], modify_kind()));

    assert_eq!(debouncer.changes.len(), 1);
    assert_eq!(debouncer.changes[&PathBuf::from("/p/a.rs")], ChangeKind::Created);
}

#[test]
fn test_state_transitions() {
    let mut debouncer = Debouncer::new();

    debouncer.add_event(&make_event(vec!["/p/restored.rs"], remove_kind()));
    debouncer.add_event(&make_event(vec!["/p/restored.rs"], create_kind()));
    debouncer.add_event(&make_event(vec!["/p/deleted.rs"], modify_kind()));
    debouncer.add_event(&make_event(vec!["/p/deleted.rs"], remove_kind()));
    debouncer.add_event(&make_event(vec!["/p/flicker.rs"], create_kind()));
    debouncer.add_event(&make_event(vec!["/p/flicker.rs"], remove_kind()));

    assert_eq!(
        debouncer.changes[&PathBuf::from("/p/restored.rs")],
        ChangeKind::Created
    );
    assert_eq!(
        debouncer.changes[&PathBuf::from("/p/deleted.rs")],
        ChangeKind::Removed
    );
    assert!(!debouncer.changes.contains_key(&PathBuf::from("/p/flicker.rs")));
}

#[test]
fn test_sleep_duration_no_events() {
    let debouncer = Debouncer::new();
    assert!(debouncer.sleep_duration() >= Duration::from_secs(3600));
}

#[test]
fn test_sleep_duration_after_event() {
    let mut debouncer = Debouncer::new();
    debouncer.last_event = Some(std::time::Instant::now());

    let dur = debouncer.sleep_duration();
    assert!(dur >= Duration::from_millis(DEBOUNCE_MS - 10));
    assert!(dur <= Duration::from_millis(DEBOUNCE_MS + 10));
}

#[test]
fn test_sleep_duration_respects_cooldown() {
    let mut debouncer = Debouncer::new();
    debouncer.last_event = Some(std::time::Instant::now());
    debouncer.last_emit = Some(std::time::Instant::now());

    let dur = debouncer.sleep_duration();
    assert!(dur >= Duration::from_millis(REBUILD_COOLDOWN_MS - 10));
    assert!(dur <= Duration::from_millis(REBUILD_COOLDOWN_MS + 10));
}

#[test]
fn test_burst_becomes_one_batch() {
    let mut debouncer = Debouncer::new();
    for name in ["/p/a.rs", "/p/b.rs", "/p/a.rs"] {
        debouncer.add_event(&make_event(vec![name], modify_kind()));
    }
    assert!(debouncer.take_if_ready().is_none());

    std::thread::sleep(Duration::from_millis(DEBOUNCE_MS + 20));
    let batch = debouncer.take_if_ready().unwrap();
    assert_eq!(batch.len(), 2);
    assert!(debouncer.take_if_ready().is_none());

    // cooldown holds the next batch back
    debouncer.add_event(&make_event(vec!["/p/c.rs"], modify_kind()));
    std::thread::sleep(Duration::from_millis(DEBOUNCE_MS + 20));
    assert!(debouncer.take_if_ready().is_none());
}

#[test]
fn test_relevant_changes_filters_and_sorts() {
    let targets = vec![
        WatchTarget::dir("/p/crate/src"),
        WatchTarget::file("/p/crate/Cargo.toml"),
    ];
    let mut raw = FxHashMap::default();
    raw.insert(PathBuf::from("/p/crate/src/lib.rs"), ChangeKind::Modified);
    raw.insert(PathBuf::from("/p/crate/Cargo.toml"), ChangeKind::Modified);
    raw.insert(PathBuf::from("/p/crate/Cargo.lock"), ChangeKind::Modified);
    raw.insert(PathBuf::from("/p/crate/src/app/mod.rs"), ChangeKind::Created);

    let changes = relevant_changes(raw, &targets);
    let paths: Vec<_> = changes.iter().map(|(p, _)| p.to_str().unwrap()).collect();
    assert_eq!(
        paths,
        ["/p/crate/Cargo.toml", "/p/crate/src/app/mod.rs", "/p/crate/src/lib.rs"]
    );
}

#[test]
fn test_watch_target_roots() {
    let file = WatchTarget::file("/p/crate/Cargo.toml");
    assert_eq!(file.watch_root(), std::path::Path::new("/p/crate"));
    assert!(file.covers(std::path::Path::new("/p/crate/Cargo.toml")));
    assert!(!file.covers(std::path::Path::new("/p/crate/Cargo.lock")));

    let dir = WatchTarget::dir("/p/crate/src");
    assert_eq!(dir.watch_root(), std::path::Path::new("/p/crate/src"));
    assert!(dir.covers(std::path::Path::new("/p/crate/src/a/b.rs")));
}

#[test]
fn test_missing_root_attached_when_created() {
    let temp = tempfile::tempdir().unwrap();
    let src = temp.path().join("crate/src");
    let manifest = temp.path().join("crate/Cargo.toml");

    let mut watcher = notify::recommended_watcher(|_| {}).unwrap();
    let mut roots = WatchRoots::new(vec![
        WatchTarget::dir(&src),
        WatchTarget::file(&manifest),
    ]);

    roots.attach_existing(&mut watcher);
    assert!(!roots.is_attached(&src));

    std::fs::create_dir_all(&src).unwrap();
    roots.maintain(&mut watcher);
    assert!(roots.is_attached(&src));
    // the manifest is watched through its now-existing parent
    assert!(roots.is_attached(&temp.path().join("crate")));
}

/// Watcher that refuses one path, like an exhausted inotify watch limit.
struct RefusingWatcher {
    refuse: PathBuf,
}

impl notify::Watcher for RefusingWatcher {
    fn new<F: notify::EventHandler>(_: F, _: notify::Config) -> notify::Result<Self> {
        Ok(Self {
            refuse: PathBuf::new(),
        })
    }

    fn watch(&mut self, path: &Path, _: notify::RecursiveMode) -> notify::Result<()> {
        if path == self.refuse {
            return Err(notify::Error::generic("watch limit reached"));
        }
        Ok(())
    }

    fn unwatch(&mut self, _: &Path) -> notify::Result<()> {
        Ok(())
    }

    fn kind() -> notify::WatcherKind {
        notify::WatcherKind::NullWatcher
    }
}

#[test]
fn test_failed_watch_skipped_and_retried() {
    let temp = tempfile::tempdir().unwrap();
    let src = temp.path().join("crate/src");
    let styles = temp.path().join("crate/yew_styles/src");
    std::fs::create_dir_all(&src).unwrap();
    std::fs::create_dir_all(&styles).unwrap();

    let mut watcher = RefusingWatcher { refuse: src.clone() };
    let mut roots = WatchRoots::new(vec![WatchTarget::dir(&src), WatchTarget::dir(&styles)]);

    roots.attach_existing(&mut watcher);
    assert!(!roots.is_attached(&src));
    assert!(roots.is_attached(&styles));

    watcher.refuse = PathBuf::new();
    roots.maintain(&mut watcher);
    assert!(roots.is_attached(&src));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_running_actor_picks_up_late_root() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().canonicalize().unwrap();
    let src = root.join("crate/src");

    let (tx, mut rx) = mpsc::channel(8);
    let actor = FsActor::new(
        vec![
            WatchTarget::dir(&src),
            WatchTarget::file(root.join("crate/Cargo.toml")),
        ],
        tx,
    )
    .unwrap();
    tokio::spawn(actor.run());

    std::fs::create_dir_all(&src).unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    std::fs::write(src.join("lib.rs"), "pub fn answer() -> u32 { 42 }").unwrap();

    let msg = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("no rebuild for the late root")
        .unwrap();
    match msg {
        BuildMsg::Rebuild { changes } => {
            assert!(changes.iter().any(|(path, _)| path == &src.join("lib.rs")));
        }
        other => panic!("unexpected message: {other:?}"),
    }
}
