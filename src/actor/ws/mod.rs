//! WebSocket Actor - live reload broadcast
//!
//! Owns every browser connection. Messages from the BuildActor are
//! broadcast to all clients; a client whose send fails is dropped.
//!
//! ```text
//! BuildActor --[Reload/Error/ClearError]--> WsActor --[broadcast]--> Clients
//! ```

mod client_io;
mod delivery;

use std::net::TcpStream;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tungstenite::WebSocket;

use super::messages::WsMsg;
use crate::reload::message::ReloadMessage;

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

/// WebSocket Actor - manages client connections and broadcasts
pub struct WsActor {
    rx: mpsc::Receiver<WsMsg>,
    /// Connected clients (shared with the reader thread)
    clients: Clients,
    /// Last rebuild error, replayed to clients that connect later
    pending_error: Option<ReloadMessage>,
    /// Stops the reader thread
    stopped: Arc<AtomicBool>,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>) -> Self {
        Self {
            rx,
            clients: Arc::new(Mutex::new(Vec::new())),
            pending_error: None,
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let clients = Arc::clone(&self.clients);
        let stopped = Arc::clone(&self.stopped);
        std::thread::spawn(move || client_io::client_reader_loop(clients, stopped));

        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::Reload => {
                    crate::debug!("reload"; "sending reload");
                    self.broadcast(&ReloadMessage::Reload);
                }

                WsMsg::Error { category, error } => {
                    let msg = ReloadMessage::error(category, error);
                    self.broadcast(&msg);
                    self.pending_error = Some(msg);
                }

                WsMsg::ClearError => {
                    self.pending_error = None;
                    self.broadcast(&ReloadMessage::ClearError);
                }

                WsMsg::AddClient(ws) => self.add_client(ws),

                WsMsg::Shutdown => {
                    crate::debug!("reload"; "shutting down");
                    self.close_all();
                    break;
                }
            }
        }
        self.stopped.store(true, Ordering::SeqCst);
    }

    fn close_all(&self) {
        let mut clients = self.clients.lock();
        for mut ws in clients.drain(..) {
            let _ = ws.close(None);
            let _ = ws.flush();
        }
    }
}
