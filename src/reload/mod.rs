//! Live reload over WebSocket.
//!
//! ```text
//! BuildActor --[Reload/Error]--> WsActor --[broadcast]--> Browser
//! ```
//!
//! - `message` - JSON messages understood by the client script
//! - `server` - listener that hands sockets to `WsActor`

pub mod message;
pub mod server;
