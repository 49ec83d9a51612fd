//! Build mode and mount mode selection.

use std::fmt;

/// Build mode, selected once at startup.
///
/// Only the literal `production` selects [`BuildMode::Production`]; any other
/// input (including an empty one) falls back to development.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    Production,
    #[default]
    Development,
}

impl BuildMode {
    /// Parse a CLI argument or environment value.
    pub fn from_arg(value: &str) -> Self {
        if value.trim() == "production" {
            Self::Production
        } else {
            Self::Development
        }
    }

    /// Check if this is production mode.
    #[inline]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    /// Flag passed to the native build command.
    pub const fn native_flag(self) -> Option<&'static str> {
        match self {
            Self::Production => None,
            Self::Development => Some("--dev"),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How the dev server is exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum MountMode {
    /// The dev server owns its own listen loop.
    #[default]
    Standalone,
    /// The dev server is mounted as middleware in front of a host app.
    Embedded,
}
