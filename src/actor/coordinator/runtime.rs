use std::time::Duration;

use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use crate::actor::build::BuildActor;
use crate::actor::fs::FsActor;
use crate::actor::messages::{BuildMsg, WsMsg};
use crate::actor::ws::WsActor;

const SHUTDOWN_POLL: Duration = Duration::from_millis(100);
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Run all actors until shutdown is signalled or the watcher exits.
pub(super) async fn run_actors(
    fs: Option<FsActor>,
    build: BuildActor,
    ws: WsActor,
    build_tx: mpsc::Sender<BuildMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    shutdown_rx: Option<Receiver<()>>,
) {
    let fs_handle = fs.map(|fs| tokio::spawn(fs.run()));
    let build_handle = tokio::spawn(build.run());
    let ws_handle = tokio::spawn(ws.run());

    loop {
        if shutdown_rx.as_ref().is_some_and(|rx| rx.try_recv().is_ok())
            || crate::core::is_shutdown()
        {
            crate::debug!("actor"; "shutdown signal received");
            break;
        }
        if fs_handle.as_ref().is_some_and(|h| h.is_finished()) {
            crate::debug!("actor"; "watcher stopped");
            break;
        }
        tokio::time::sleep(SHUTDOWN_POLL).await;
    }

    let _ = build_tx.send(BuildMsg::Shutdown).await;
    let _ = ws_tx.send(WsMsg::Shutdown).await;

    let _ = tokio::time::timeout(SHUTDOWN_GRACE, build_handle).await;
    let _ = tokio::time::timeout(SHUTDOWN_GRACE, ws_handle).await;
}
