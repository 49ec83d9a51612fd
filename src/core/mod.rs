//! Core types shared across the codebase.

mod error;
mod mode;
mod state;

pub use error::{BuildError, ServeError};
pub use mode::{BuildMode, MountMode};
pub use state::{is_ready, is_shutdown, register_server, set_ready, setup_shutdown_handler};
