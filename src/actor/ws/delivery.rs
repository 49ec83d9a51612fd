use tungstenite::protocol::Message;

use super::WsActor;
use crate::reload::message::ReloadMessage;

impl WsActor {
    /// Send to every client; clients that fail are dropped.
    pub(super) fn broadcast(&self, msg: &ReloadMessage) {
        let mut clients = self.clients.lock();
        if clients.is_empty() {
            crate::debug!("reload"; "no clients connected");
            return;
        }

        let frame = Message::Text(msg.to_json().into());
        clients.retain_mut(|ws| match ws.send(frame.clone()) {
            Ok(()) => true,
            Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
                // frame is buffered; flushed by the next write
                true
            }
            Err(e) => {
                crate::debug!("reload"; "client dropped: {}", e);
                false
            }
        });
        crate::debug!("reload"; "broadcast to {} clients", clients.len());
    }

    #[cfg(test)]
    pub(super) fn client_count(&self) -> usize {
        self.clients.lock().len()
    }
}
