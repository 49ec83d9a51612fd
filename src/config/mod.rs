//! Build configuration.
//!
//! Derived once at startup from three layers (later wins):
//!
//! | Layer              | Provides                                     |
//! |--------------------|----------------------------------------------|
//! | defaults           | `dist/index.html` at `/`, port `1234`        |
//! | environment/`.env` | `SERVER_ADDRESS`, `NODE_ENV`                 |
//! | CLI                | positional mode and path/flag overrides      |
//!
//! The result is immutable and shared as `Arc<BuildConfig>`.

mod env;
mod error;

pub use env::Env;
pub use error::ConfigError;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::core::{BuildMode, MountMode};

/// Listen port used when `SERVER_ADDRESS` is absent or empty.
pub const DEFAULT_PORT: u16 = 1234;

/// Default WebSocket port for hot reload.
pub const DEFAULT_WS_PORT: u16 = 35729;

/// Native build script, relative to the project root.
pub const DEFAULT_NATIVE_CMD: &str = "wasm_pack_cmd";

/// Source paths watched for changes, relative to the project root.
pub const WATCH_TARGETS: &[&str] = &[
    "crate/src",
    "crate/Cargo.toml",
    "crate/yew_styles/src",
    "crate/yew_styles/Cargo.toml",
];

/// Build configuration, immutable after startup.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Absolute project root
    pub root: PathBuf,
    /// HTML entry point (absolute)
    pub entry: PathBuf,
    /// Output directory (absolute)
    pub out_dir: PathBuf,
    /// File name of the bundled entry inside `out_dir`
    pub out_file: String,
    /// URL prefix the bundle is served under, always `/`-delimited
    pub public_url: String,
    /// Watch sources and live reload
    pub watch: bool,
    /// Minify bundled JS/CSS
    pub minify: bool,
    pub mode: BuildMode,
    pub mount: MountMode,
    /// HTTP listen address
    pub address: SocketAddr,
    /// Native build command (absolute)
    pub native_cmd: PathBuf,
    pub ws_port: u16,
}

impl BuildConfig {
    /// Derive the configuration from CLI arguments and an environment snapshot.
    pub fn load(cli: &Cli, env: &Env) -> Result<Self, ConfigError> {
        let root = resolve_root(cli.root.as_deref())?;

        let mode = cli
            .mode
            .as_deref()
            .or_else(|| env.get("NODE_ENV"))
            .map(BuildMode::from_arg)
            .unwrap_or_default();

        let address = match env.get("SERVER_ADDRESS") {
            Some(value) => parse_address(value)?,
            None => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
        };

        let public_url = normalize_public_url(cli.public_url.as_deref().unwrap_or("/"))?;

        let entry = root.join(cli.entry.as_deref().unwrap_or(Path::new("index.html")));
        let out_file = entry
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "index.html".to_string());

        Ok(Self {
            entry,
            out_dir: root.join(cli.out_dir.as_deref().unwrap_or(Path::new("dist"))),
            out_file,
            public_url,
            watch: !cli.no_watch,
            minify: mode.is_production(),
            mode,
            mount: cli.mount.unwrap_or_default(),
            address,
            native_cmd: root.join(
                cli.native_cmd
                    .as_deref()
                    .unwrap_or(Path::new(DEFAULT_NATIVE_CMD)),
            ),
            ws_port: cli.ws_port.unwrap_or(DEFAULT_WS_PORT),
            root,
        })
    }

    /// Whether responses are gzip-compressed.
    #[inline]
    pub const fn compress(&self) -> bool {
        self.mode.is_production()
    }

    /// Absolute paths of the watch target set.
    pub fn watch_targets(&self) -> Vec<PathBuf> {
        WATCH_TARGETS.iter().map(|p| self.root.join(p)).collect()
    }

    /// Path of the bundled entry file.
    pub fn out_entry(&self) -> PathBuf {
        self.out_dir.join(&self.out_file)
    }
}

fn resolve_root(root: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let root = root.unwrap_or(Path::new("."));
    root.canonicalize()
        .map_err(|e| ConfigError::Root(root.to_path_buf(), e))
}

/// Parse `SERVER_ADDRESS`: a bare port binds all interfaces.
fn parse_address(value: &str) -> Result<SocketAddr, ConfigError> {
    if let Ok(port) = value.parse::<u16>() {
        return Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port));
    }
    if let Ok(addr) = value.parse::<SocketAddr>() {
        return Ok(addr);
    }
    if let Some(port) = value
        .strip_prefix("localhost:")
        .and_then(|p| p.parse::<u16>().ok())
    {
        return Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port));
    }
    Err(ConfigError::Address {
        value: value.to_string(),
    })
}

/// Normalize to `/segment/.../` form.
fn normalize_public_url(value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.contains("://") || trimmed.contains("..") || trimmed.contains('?') {
        return Err(ConfigError::PublicUrl(value.to_string()));
    }
    let segments: Vec<_> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        Ok("/".to_string())
    } else {
        Ok(format!("/{}/", segments.join("/")))
    }
}
