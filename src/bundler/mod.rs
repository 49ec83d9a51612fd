//! Bundler: turns the HTML entry point into a servable output directory.
//!
//! A bundle pass fires the registered build-start hooks (the native wasm
//! build) and then emits the entry document with every asset it references.
//!
//! # Example
//!
//! ```ignore
//! let mut bundler = Bundler::new(config.clone());
//! bundler.on_build_start(NativeBuild::from_config(&config));
//! let report = bundler.bundle()?;
//! ```

mod emit;
mod graph;
mod html;
mod minify;

pub use emit::BundleReport;

use std::sync::Arc;

use crate::config::BuildConfig;
use crate::core::BuildError;

/// Work run at the start of every bundle pass.
pub trait BuildStartHook: Send + Sync {
    fn name(&self) -> &str;

    fn on_build_start(&self) -> Result<(), BuildError>;
}

pub struct Bundler {
    config: Arc<BuildConfig>,
    hooks: Vec<Box<dyn BuildStartHook>>,
}

impl Bundler {
    pub fn new(config: Arc<BuildConfig>) -> Self {
        Self {
            config,
            hooks: Vec::new(),
        }
    }

    /// Register a hook; hooks fire in registration order.
    pub fn on_build_start(&mut self, hook: impl BuildStartHook + 'static) {
        self.hooks.push(Box::new(hook));
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Fire build-start hooks, stopping at the first failure.
    pub fn start(&self) -> Result<(), BuildError> {
        for hook in &self.hooks {
            crate::debug!("bundle"; "build start: {}", hook.name());
            hook.on_build_start()?;
        }
        Ok(())
    }

    /// Emit the entry document and its assets into the output directory.
    pub fn emit(&self) -> Result<BundleReport, BuildError> {
        emit::emit(&self.config)
    }

    /// Full pass: build-start hooks, then emit.
    pub fn bundle(&self) -> Result<BundleReport, BuildError> {
        self.start()?;
        self.emit()
    }
}
