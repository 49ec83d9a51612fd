//! Asset dependency discovery.
//!
//! Not a module graph: only enough of JS and CSS is scanned to find the
//! files a wasm-bindgen app loads at runtime, so the glue script and its
//! `.wasm` binary are emitted side by side.

use std::sync::LazyLock;

use regex::Regex;

use super::html::local_path;

/// How a dependency was referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepKind {
    /// `import`/`export ... from`, `import("...")`
    Import,
    /// `new URL("...", import.meta.url)` or a quoted `.wasm` path
    Url,
    /// CSS `url(...)` or `@import`
    Style,
}

/// A specifier found in an asset's source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dep {
    pub specifier: String,
    pub kind: DepKind,
}

static JS_IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:\bimport|\bexport)\s[^;'"]*?\bfrom\s*["']([^"']+)["']|\bimport\s*["']([^"']+)["']|\bimport\s*\(\s*["']([^"']+)["']\s*\)"#,
    )
    .expect("valid import regex")
});

static JS_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"new\s+URL\s*\(\s*["']([^"']+)["']\s*,\s*import\.meta\.url|["']([^"'\s]+\.wasm)["']"#,
    )
    .expect("valid url regex")
});

static CSS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*["']?([^"')\s]+)["']?\s*\)|@import\s+["']([^"']+)["']"#)
        .expect("valid css regex")
});

/// Scan JavaScript source for local dependencies.
///
/// Bare module specifiers (`react`, `@scope/pkg`) are not resolved and
/// are skipped.
pub fn js_deps(source: &str) -> Vec<Dep> {
    let mut deps = Vec::new();

    for caps in JS_IMPORT_RE.captures_iter(source) {
        let Some(m) = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)) else {
            continue;
        };
        let spec = m.as_str();
        if is_relative(spec) {
            push_unique(&mut deps, spec, DepKind::Import);
        }
    }

    for caps in JS_URL_RE.captures_iter(source) {
        let Some(m) = caps.get(1).or_else(|| caps.get(2)) else {
            continue;
        };
        if let Some(path) = local_path(m.as_str()) {
            push_unique(&mut deps, path, DepKind::Url);
        }
    }

    deps
}

/// Scan CSS source for local `url()` and `@import` dependencies.
pub fn css_deps(source: &str) -> Vec<Dep> {
    let mut deps = Vec::new();
    for caps in CSS_RE.captures_iter(source) {
        let Some(m) = caps.get(1).or_else(|| caps.get(2)) else {
            continue;
        };
        if let Some(path) = local_path(m.as_str()) {
            push_unique(&mut deps, path, DepKind::Style);
        }
    }
    deps
}

fn is_relative(spec: &str) -> bool {
    spec.starts_with("./") || spec.starts_with("../") || spec.starts_with('/')
}

fn push_unique(deps: &mut Vec<Dep>, specifier: &str, kind: DepKind) {
    if !deps.iter().any(|d| d.specifier == specifier) {
        deps.push(Dep {
            specifier: specifier.to_string(),
            kind,
        });
    }
}

/// Prefix root-relative specifiers with `public_url`.
///
/// Only quoted or `url(...)`-delimited occurrences of a found specifier are
/// replaced. Returns `None` when nothing changed.
pub fn rebase_rooted(source: &str, deps: &[Dep], public_url: &str) -> Option<String> {
    if public_url == "/" {
        return None;
    }

    let mut out = source.to_string();
    let mut changed = false;
    for dep in deps {
        let Some(rest) = dep.specifier.strip_prefix('/') else {
            continue;
        };
        for (open, close) in [('"', '"'), ('\'', '\''), ('(', ')')] {
            let from = format!("{open}{}{close}", dep.specifier);
            if out.contains(&from) {
                out = out.replace(&from, &format!("{open}{public_url}{rest}{close}"));
                changed = true;
            }
        }
    }
    changed.then_some(out)
}
