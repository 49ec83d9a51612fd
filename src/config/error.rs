//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid server address `{value}` (expected `port` or `host:port`)")]
    Address { value: String },

    #[error("failed to resolve project root `{}`", .0.display())]
    Root(PathBuf, #[source] std::io::Error),

    #[error("public url must be a path like `/` or `/app/`, got `{0}`")]
    PublicUrl(String),
}
