//! Rebuild-cycle error types.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Failure of a single rebuild cycle.
///
/// None of these are fatal: the coordinator logs them and returns to
/// watching.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to start `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}")]
    Native { command: String, status: ExitStatus },

    #[error("{message}: {}", path.display())]
    Bundle { path: PathBuf, message: String },

    #[error("IO error at `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("build task panicked")]
    Panicked,
}

impl BuildError {
    /// Error category used as the log prefix.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Spawn { .. } | Self::Native { .. } => "native",
            Self::Bundle { .. } | Self::Io(..) | Self::Panicked => "bundle",
        }
    }

    pub(crate) fn bundle(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Bundle {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Dev server startup failure. Always fatal.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to bind {addr}")]
    Bind {
        addr: SocketAddr,
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let spawn = BuildError::Spawn {
            command: "./wasm_pack_cmd".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(spawn.category(), "native");
        assert_eq!(BuildError::bundle("index.html", "missing").category(), "bundle");
        assert_eq!(BuildError::Panicked.category(), "bundle");
    }

    #[test]
    fn test_bundle_message_names_path() {
        let err = BuildError::bundle("/site/index.html", "entry not found");
        assert_eq!(err.to_string(), "entry not found: /site/index.html");
    }

    #[test]
    fn test_bind_error_names_address() {
        let err = ServeError::Bind {
            addr: "0.0.0.0:1234".parse().unwrap(),
            source: "address in use".into(),
        };
        assert_eq!(err.to_string(), "failed to bind 0.0.0.0:1234");
        assert_eq!(
            std::error::Error::source(&err).map(ToString::to_string).as_deref(),
            Some("address in use")
        );
    }
}
