//! Emit the entry document and its assets into the output directory.

use std::collections::VecDeque;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rustc_hash::{FxHashMap, FxHashSet};

use super::graph::{self, Dep};
use super::html;
use super::minify::minify_by_ext;
use crate::config::BuildConfig;
use crate::core::BuildError;
use crate::utils::path::{clean_relative, decode_url_path, to_url_path};

/// Length of the hex content hash in cache-busting queries.
const VERSION_LEN: usize = 8;

/// Outcome of a successful emit.
#[derive(Debug, Clone, Default)]
pub struct BundleReport {
    /// Assets written besides the entry document
    pub assets: usize,
    /// Total bytes written, entry included
    pub bytes: u64,
    pub duration: Duration,
}

impl fmt::Display for BundleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} assets ({}) in {}ms",
            self.assets,
            format_bytes(self.bytes),
            self.duration.as_millis()
        )
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    match bytes {
        b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.1} KB", b as f64 / KB as f64),
        b => format!("{b} B"),
    }
}

/// An asset queued for emission, relative to the entry directory.
struct Asset {
    rel: PathBuf,
    content: Vec<u8>,
}

pub fn emit(config: &BuildConfig) -> Result<BundleReport, BuildError> {
    let start = Instant::now();
    let entry = &config.entry;
    let base = entry.parent().unwrap_or(&config.root);

    let source = fs::read_to_string(entry).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => BuildError::bundle(entry, "entry not found"),
        _ => BuildError::Io(entry.clone(), e),
    })?;
    let refs = html::collect_refs(&source).map_err(|msg| BuildError::bundle(entry, msg))?;

    // raw attribute value -> entry-relative path
    let mut roots: Vec<(String, PathBuf)> = Vec::with_capacity(refs.len());
    for r in &refs {
        let rel = resolve(Path::new(""), &r.path)
            .ok_or_else(|| BuildError::bundle(base.join(&r.path), "asset outside project"))?;
        roots.push((r.raw.clone(), rel));
    }

    let assets = collect_assets(base, roots.iter().map(|(_, rel)| rel.clone()))?;

    fs::create_dir_all(&config.out_dir)
        .map_err(|e| BuildError::Io(config.out_dir.clone(), e))?;

    let mut bytes = 0u64;
    let mut versions: FxHashMap<&Path, String> = FxHashMap::default();
    for asset in &assets {
        let rebased = rebase_rooted(&asset.rel, &asset.content, &config.public_url);
        let source = rebased.as_deref().unwrap_or(&asset.content);
        let minified = if config.minify {
            minify_by_ext(&asset.rel, source)
        } else {
            None
        };
        let content = minified.as_deref().unwrap_or(source);

        let dest = config.out_dir.join(&asset.rel);
        if dest != base.join(&asset.rel) {
            write_file(&dest, content)?;
        }
        bytes += content.len() as u64;
        versions.insert(&asset.rel, version_of(content));
    }

    let replacements: FxHashMap<String, String> = roots
        .iter()
        .map(|(raw, rel)| {
            let mut url = format!("{}{}", config.public_url, to_url_path(rel));
            if !config.mode.is_production()
                && let Some(v) = versions.get(rel.as_path())
            {
                url.push_str("?v=");
                url.push_str(v);
            }
            (raw.clone(), url)
        })
        .collect();

    let output = html::rewrite(&source, &replacements);
    write_file(&config.out_entry(), output.as_bytes())?;
    bytes += output.len() as u64;

    Ok(BundleReport {
        assets: assets.len(),
        bytes,
        duration: start.elapsed(),
    })
}

/// Walk from the document's references through JS and CSS dependencies.
fn collect_assets(
    base: &Path,
    roots: impl Iterator<Item = PathBuf>,
) -> Result<Vec<Asset>, BuildError> {
    let mut seen = FxHashSet::default();
    let mut queue: VecDeque<PathBuf> = VecDeque::new();
    for rel in roots {
        if seen.insert(rel.clone()) {
            queue.push_back(rel);
        }
    }

    let mut assets = Vec::new();
    while let Some(rel) = queue.pop_front() {
        let path = base.join(&rel);
        let content = read_asset(&path)?;

        let from = rel.parent().unwrap_or(Path::new(""));
        for dep in scan_deps(&rel, &content) {
            let dep_rel = resolve(from, &dep.specifier).ok_or_else(|| {
                BuildError::bundle(path.clone(), format!("`{}` escapes project", dep.specifier))
            })?;
            if seen.insert(dep_rel.clone()) {
                queue.push_back(dep_rel);
            }
        }

        assets.push(Asset { rel, content });
    }
    Ok(assets)
}

fn scan_deps(rel: &Path, content: &[u8]) -> Vec<Dep> {
    let Ok(source) = std::str::from_utf8(content) else {
        return Vec::new();
    };
    match rel.extension().and_then(|e| e.to_str()) {
        Some("js" | "mjs") => graph::js_deps(source),
        Some("css") => graph::css_deps(source),
        _ => Vec::new(),
    }
}

/// Point root-relative references inside JS and CSS under the public URL.
fn rebase_rooted(rel: &Path, content: &[u8], public_url: &str) -> Option<Vec<u8>> {
    if public_url == "/" {
        return None;
    }
    let source = std::str::from_utf8(content).ok()?;
    let deps = scan_deps(rel, content);
    graph::rebase_rooted(source, &deps, public_url).map(String::into_bytes)
}

/// Resolve a reference against `from` (relative to the entry directory).
///
/// A leading `/` is relative to the entry directory itself.
fn resolve(from: &Path, specifier: &str) -> Option<PathBuf> {
    let decoded = decode_url_path(specifier)?;
    let rel = match decoded.strip_prefix('/') {
        Some(rooted) => PathBuf::from(rooted),
        None => from.join(&decoded),
    };
    clean_relative(&rel).filter(|p| !p.as_os_str().is_empty())
}

fn read_asset(path: &Path) -> Result<Vec<u8>, BuildError> {
    fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => BuildError::bundle(path, "asset not found"),
        _ => BuildError::Io(path.to_path_buf(), e),
    })
}

fn write_file(dest: &Path, content: &[u8]) -> Result<(), BuildError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::Io(parent.to_path_buf(), e))?;
    }
    fs::write(dest, content).map_err(|e| BuildError::Io(dest.to_path_buf(), e))
}

fn version_of(content: &[u8]) -> String {
    let hash = blake3::hash(content).to_hex();
    hash.as_str()[..VERSION_LEN].to_string()
}
