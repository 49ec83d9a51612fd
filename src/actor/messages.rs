//! Actor Message Definitions
//!
//! ```text
//! FsActor --Rebuild--> BuildActor --Reload/Error--> WsActor
//! ```

use std::net::TcpStream;
use std::path::PathBuf;

use tungstenite::WebSocket;

use crate::bundler::BundleReport;
use crate::core::BuildError;

/// What happened to a watched file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

/// A debounced change to one path.
pub type Change = (PathBuf, ChangeKind);

/// Messages to BuildActor
#[derive(Debug)]
pub enum BuildMsg {
    /// Run a rebuild cycle for a debounced batch (empty for the initial build)
    Rebuild { changes: Vec<Change> },
    /// A cycle running on the blocking pool finished
    CycleDone(Result<BundleReport, BuildError>),
    Shutdown,
}

/// Messages to WebSocket Actor
#[derive(Debug)]
pub enum WsMsg {
    /// Full page reload on every client
    Reload,
    /// Rebuild failed (display overlay, no reload)
    Error { category: String, error: String },
    /// Clear error overlay (rebuild succeeded after a failure)
    ClearError,
    /// Client whose websocket handshake completed
    AddClient(WebSocket<TcpStream>),
    Shutdown,
}
