//! Actor Coordinator - wires up watch mode
//!
//! A thin orchestrator that creates the channels, starts the websocket
//! listener, queues the initial build and runs the actors until shutdown.

mod runtime;
mod watch_paths;

use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::build::BuildActor;
use super::fs::FsActor;
use super::messages::{BuildMsg, WsMsg};
use super::ws::WsActor;
use crate::bundler::Bundler;
use crate::config::BuildConfig;

const CHANNEL_BUFFER: usize = 32;

pub struct Coordinator {
    config: Arc<BuildConfig>,
    bundler: Arc<Bundler>,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn new(config: Arc<BuildConfig>, bundler: Arc<Bundler>) -> Self {
        Self {
            config,
            bundler,
            shutdown_rx: None,
        }
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system.
    ///
    /// `on_ws_port` receives the websocket port actually bound, which may
    /// differ from the configured one.
    pub async fn run(mut self, on_ws_port: impl FnOnce(u16)) -> Result<()> {
        let (build_tx, build_rx) = mpsc::channel::<BuildMsg>(CHANNEL_BUFFER);
        let (ws_tx, ws_rx) = mpsc::channel::<WsMsg>(CHANNEL_BUFFER);

        match crate::reload::server::start_ws_server(self.config.ws_port, ws_tx.clone()) {
            Ok(port) => {
                crate::debug!("reload"; "websocket on 127.0.0.1:{}", port);
                on_ws_port(port);
            }
            Err(e) => crate::log!("reload"; "live reload disabled: {:#}", e),
        }

        // Watcher first, so changes made during the initial build are kept.
        // Without one the dev server still builds and serves once.
        let targets = watch_paths::collect_watch_targets(&self.config);
        let fs_actor = match FsActor::new(targets, build_tx.clone()) {
            Ok(actor) => Some(actor),
            Err(e) => {
                crate::log!("watch"; "file watching disabled: {}", e);
                None
            }
        };

        let build_actor = BuildActor::new(
            build_rx,
            build_tx.clone(),
            ws_tx.clone(),
            Arc::clone(&self.bundler),
        );
        let ws_actor = WsActor::new(ws_rx);

        build_tx
            .send(BuildMsg::Rebuild { changes: Vec::new() })
            .await
            .context("build actor unavailable")?;

        crate::debug!("actor"; "start");
        runtime::run_actors(
            fs_actor,
            build_actor,
            ws_actor,
            build_tx,
            ws_tx,
            self.shutdown_rx.take(),
        )
        .await;
        crate::debug!("actor"; "stopped");

        Ok(())
    }
}
