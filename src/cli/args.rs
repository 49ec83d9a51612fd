//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

use crate::core::MountMode;

/// Development server for rust/wasm web apps
#[derive(Parser, Debug, Clone, Default)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Build mode: `production` minifies and compresses, anything else is development.
    /// Falls back to `NODE_ENV` when omitted
    #[arg(value_name = "MODE")]
    pub mode: Option<String>,

    /// Project root (defaults to the current directory)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// HTML entry point (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub entry: Option<PathBuf>,

    /// Output directory path (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub out_dir: Option<PathBuf>,

    /// Public URL prefix the bundle is served under
    #[arg(short = 'u', long)]
    pub public_url: Option<String>,

    /// Serve standalone or mount the dev server in front of a host app
    #[arg(short, long, value_enum)]
    pub mount: Option<MountMode>,

    /// Build once and exit instead of watching and serving
    #[arg(long)]
    pub no_watch: bool,

    /// Native build command (relative to project root)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub native_cmd: Option<PathBuf>,

    /// WebSocket port for live reload
    #[arg(long)]
    pub ws_port: Option<u16>,

    /// Enable verbose output for debugging
    #[arg(short, long)]
    pub verbose: bool,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_mode() {
        let cli = Cli::parse_from(["wasmserve", "production"]);
        assert_eq!(cli.mode.as_deref(), Some("production"));
        assert!(!cli.no_watch);
    }

    #[test]
    fn test_no_arguments() {
        let cli = Cli::parse_from(["wasmserve"]);
        assert!(cli.mode.is_none());
        assert!(cli.mount.is_none());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from([
            "wasmserve",
            "dev",
            "--mount",
            "embedded",
            "--no-watch",
            "--out-dir",
            "build",
            "--ws-port",
            "40000",
        ]);
        assert_eq!(cli.mount, Some(MountMode::Embedded));
        assert!(cli.no_watch);
        assert_eq!(cli.out_dir, Some(PathBuf::from("build")));
        assert_eq!(cli.ws_port, Some(40000));
    }

    #[test]
    fn test_verbose_and_version_flags_coexist() {
        use clap::CommandFactory;
        Cli::command().debug_assert();

        let cli = Cli::parse_from(["wasmserve", "-v"]);
        assert!(cli.verbose);

        let err = Cli::try_parse_from(["wasmserve", "-V"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
