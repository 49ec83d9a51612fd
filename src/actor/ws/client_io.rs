use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::{Clients, WsActor};
use crate::reload::message::ReloadMessage;

const READ_POLL: Duration = Duration::from_millis(100);

impl WsActor {
    /// Greet an upgraded client and register it.
    pub(super) fn add_client(&self, mut ws: WebSocket<TcpStream>) {
        // Non-blocking from here on so the reader thread can poll
        let _ = ws.get_ref().set_nonblocking(true);

        let hello = ReloadMessage::connected();
        if let Err(e) = ws.send(Message::Text(hello.to_json().into())) {
            crate::debug!("reload"; "failed to greet client: {}", e);
            return;
        }

        if let Some(err) = &self.pending_error
            && let Err(e) = ws.send(Message::Text(err.to_json().into()))
        {
            crate::debug!("reload"; "failed to send pending error: {}", e);
            return;
        }

        let mut clients = self.clients.lock();
        clients.push(ws);
        crate::debug!("reload"; "client registered (total: {})", clients.len());
    }
}

/// Drain incoming frames so pings are answered and closed sockets dropped.
pub(super) fn client_reader_loop(clients: Clients, stopped: Arc<AtomicBool>) {
    while !stopped.load(Ordering::SeqCst) {
        std::thread::sleep(READ_POLL);

        let mut clients = clients.lock();
        clients.retain_mut(|ws| loop {
            match ws.read() {
                Ok(Message::Close(_)) => break false,
                Ok(_) => continue,
                Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    break true;
                }
                Err(_) => break false,
            }
        });
    }
}
