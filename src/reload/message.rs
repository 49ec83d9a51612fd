//! Live reload message protocol.
//!
//! JSON messages pushed to browser clients over the websocket:
//!
//! - `reload`: full page reload, serialized exactly as `{"type":"reload"}`
//! - `connected`: handshake acknowledgement with the server version
//! - `error`: rebuild failure, shown as an overlay
//! - `clear_error`: dismiss the overlay

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    Reload,

    Connected {
        /// Server version for compatibility check
        version: String,
    },

    /// Rebuild failure (no reload)
    Error {
        /// Failure category, e.g. `native` or `bundle`
        category: String,
        error: String,
    },

    #[serde(rename = "clear_error")]
    ClearError,
}

impl ReloadMessage {
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn error(category: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Error {
            category: category.into(),
            error: error.into(),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }

    #[cfg(test)]
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}
