//! wasmserve - development server for rust/wasm web apps.
//!
//! Watches the crate sources, runs the native build and bundles the HTML
//! entry on every change, then tells connected browsers to reload.

mod actor;
mod bundler;
mod cli;
mod config;
mod core;
mod embed;
mod logger;
mod native;
mod reload;
mod utils;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};

use bundler::Bundler;
use cli::Cli;
use config::{BuildConfig, Env};
use native::NativeBuild;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log!("error"; "{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let env = Env::capture(cli.root.as_deref().unwrap_or(Path::new(".")));
    let config = Arc::new(BuildConfig::load(&cli, &env)?);
    debug!(
        "config";
        "{} mode, serving {} from {}",
        config.mode,
        config.public_url,
        config.out_dir.display()
    );

    let mut bundler = Bundler::new(Arc::clone(&config));
    bundler.on_build_start(NativeBuild::from_config(&config));

    if !config.watch {
        return build_once(&bundler);
    }

    let server = cli::serve::bind_server(Arc::clone(&config))?;
    server.run(bundler)
}

/// `--no-watch`: native build and bundle once.
fn build_once(bundler: &Bundler) -> Result<()> {
    match bundler.bundle() {
        Ok(report) => {
            log!("bundle"; "built {}", report);
            Ok(())
        }
        Err(e) => {
            let category = e.category();
            Err(anyhow::Error::new(e).context(format!("[{category}] build failed")))
        }
    }
}
