//! WebSocket listener for live reload.
//!
//! Each accepted socket is upgraded on its own thread with a read timeout,
//! so a client that never sends the upgrade request cannot stall anyone
//! else. Only upgraded sockets reach `WsActor`.

use std::net::{TcpListener, TcpStream};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tungstenite::WebSocket;

use crate::actor::messages::WsMsg;

/// Ports tried after the configured one is taken
const MAX_PORT_RETRIES: u16 = 10;

const ACCEPT_POLL: Duration = Duration::from_millis(100);

/// How long a client may take to send the upgrade request
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Bind the websocket listener and start the acceptor thread.
///
/// Returns the port actually bound. The thread exits once the actor's
/// channel is closed.
pub fn start_ws_server(base_port: u16, ws_tx: mpsc::Sender<WsMsg>) -> Result<u16> {
    let (listener, port) = try_bind_port(base_port, MAX_PORT_RETRIES)?;
    listener
        .set_nonblocking(true)
        .context("failed to configure websocket listener")?;

    std::thread::spawn(move || {
        loop {
            match listener.accept() {
                Ok((stream, addr)) => {
                    crate::debug!("reload"; "client connected: {}", addr);
                    spawn_handshake(stream, ws_tx.clone());
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    if ws_tx.is_closed() || crate::core::is_shutdown() {
                        break;
                    }
                    std::thread::sleep(ACCEPT_POLL);
                }
                Err(e) => {
                    crate::log!("reload"; "accept error: {}", e);
                    std::thread::sleep(ACCEPT_POLL);
                }
            }
        }
    });

    Ok(port)
}

fn spawn_handshake(stream: TcpStream, ws_tx: mpsc::Sender<WsMsg>) {
    std::thread::spawn(move || match handshake(stream) {
        Ok(ws) => {
            let _ = ws_tx.blocking_send(WsMsg::AddClient(ws));
        }
        Err(e) => crate::debug!("reload"; "{:#}", e),
    });
}

/// Upgrade an accepted socket, giving up after [`HANDSHAKE_TIMEOUT`].
pub(crate) fn handshake(stream: TcpStream) -> Result<WebSocket<TcpStream>> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(HANDSHAKE_TIMEOUT))?;
    let ws = tungstenite::accept(stream).map_err(|e| anyhow::anyhow!("handshake failed: {e}"))?;
    ws.get_ref().set_read_timeout(None)?;
    Ok(ws)
}

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(("127.0.0.1", port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "failed to bind websocket server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}
