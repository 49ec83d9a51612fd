//! Server lifecycle: the actor system thread and graceful shutdown.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;

use super::DevServer;
use crate::actor::Coordinator;
use crate::bundler::Bundler;
use crate::log;

/// Grace period for the actors after the listen loop ends.
const SHUTDOWN_POLLS: u32 = 40;
const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Spawn the actor system (watcher, rebuilds, live reload) on its own runtime.
pub fn spawn_actors(
    server: Arc<DevServer>,
    bundler: Arc<Bundler>,
    shutdown_rx: Receiver<()>,
) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("wasmserve-actors".into())
        .spawn(move || run_actor_system(server, bundler, shutdown_rx))
        .context("failed to spawn actor thread")
}

fn run_actor_system(server: Arc<DevServer>, bundler: Arc<Bundler>, shutdown_rx: Receiver<()>) {
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            log!("actor"; "failed to create runtime: {}", e);
            return;
        }
    };

    let config = Arc::clone(&server.config);
    rt.block_on(async {
        let coordinator = Coordinator::new(config, bundler).with_shutdown_signal(shutdown_rx);
        if let Err(e) = coordinator.run(|port| server.set_ws_port(port)).await {
            log!("actor"; "error: {:#}", e);
        }
    });
}

/// Wait for the actor system to stop (max 2 seconds).
pub fn wait_for_shutdown(handle: JoinHandle<()>) {
    for _ in 0..SHUTDOWN_POLLS {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(SHUTDOWN_POLL_INTERVAL);
    }
}
