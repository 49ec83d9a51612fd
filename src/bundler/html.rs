//! HTML entry scanning and reference rewriting.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use rustc_hash::FxHashMap;

/// Attributes that point at bundled assets, per tag.
const ASSET_ATTRS: &[(&str, &str)] = &[
    ("script", "src"),
    ("link", "href"),
    ("img", "src"),
    ("source", "src"),
    ("audio", "src"),
    ("video", "src"),
    ("video", "poster"),
];

/// `rel` tokens of `<link>` elements whose `href` is an asset.
const LINK_ASSET_RELS: &[&str] = &[
    "stylesheet",
    "icon",
    "apple-touch-icon",
    "manifest",
    "preload",
    "modulepreload",
];

/// A local asset reference found in the entry document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    /// Attribute value as written in the document
    pub raw: String,
    /// Path part of `raw` (query and fragment stripped)
    pub path: String,
}

/// Collect local asset references in document order, deduplicated.
pub fn collect_refs(html: &str) -> Result<Vec<AssetRef>, String> {
    let dom = tl::parse(html, tl::ParserOptions::default())
        .map_err(|_| "failed to parse HTML entry".to_string())?;

    let mut refs: Vec<AssetRef> = Vec::new();
    for node in dom.nodes() {
        let Some(tag) = node.as_tag() else { continue };
        let name = tag.name().as_utf8_str().to_ascii_lowercase();

        let attrs: FxHashMap<String, String> = tag
            .attributes()
            .iter()
            .map(|(key, value)| {
                let key: &str = key.as_ref();
                (
                    key.to_ascii_lowercase(),
                    value.map(|v| v.to_string()).unwrap_or_default(),
                )
            })
            .collect();

        if name == "link" && !is_asset_link(attrs.get("rel").map(String::as_str)) {
            continue;
        }

        for (_, attr) in ASSET_ATTRS.iter().filter(|(t, _)| *t == name) {
            let Some(raw) = attrs.get(*attr) else { continue };
            let Some(path) = local_path(raw) else { continue };
            if !refs.iter().any(|r| r.raw == *raw) {
                refs.push(AssetRef {
                    raw: raw.clone(),
                    path: path.to_string(),
                });
            }
        }
    }
    Ok(refs)
}

fn is_asset_link(rel: Option<&str>) -> bool {
    rel.is_some_and(|rel| {
        rel.split_ascii_whitespace()
            .any(|token| LINK_ASSET_RELS.iter().any(|r| token.eq_ignore_ascii_case(r)))
    })
}

/// Path part of a reference, or `None` when it does not name a local file.
///
/// External (`scheme:` or `//host`), fragment-only and empty references
/// are left to the browser.
pub fn local_path(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('#') || raw.starts_with("//") {
        return None;
    }
    if let Some(colon) = raw.find(':')
        && !raw[..colon].contains('/')
    {
        return None;
    }
    let end = raw.find(['?', '#']).unwrap_or(raw.len());
    let path = &raw[..end];
    (!path.is_empty()).then_some(path)
}

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(\s)(src|href|poster)(\s*=\s*)(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("valid attribute regex")
});

/// Replace attribute values found in `replacements` (keyed by raw value).
pub fn rewrite(html: &str, replacements: &FxHashMap<String, String>) -> String {
    ATTR_RE
        .replace_all(html, |caps: &Captures| {
            let value = caps
                .get(4)
                .or_else(|| caps.get(5))
                .or_else(|| caps.get(6))
                .map_or("", |m| m.as_str());
            match replacements.get(value) {
                Some(new) => format!("{}{}{}\"{new}\"", &caps[1], &caps[2], &caps[3]),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
<html>
<head>
  <link rel="stylesheet" href="./static/app.css">
  <link rel="canonical" href="https://example.com/">
  <link rel="icon" href="favicon.ico?x=1">
</head>
<body>
  <img src="img/logo.png" alt="">
  <a href="about.html">about</a>
  <script type="module" src="./index.js"></script>
  <script src="//cdn.example.com/lib.js"></script>
  <img src="data:image/png;base64,AAAA">
</body>
</html>"#;

    #[test]
    fn test_collect_refs_skips_external() {
        let refs = collect_refs(PAGE).unwrap();
        let paths: Vec<_> = refs.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(
            paths,
            ["./static/app.css", "favicon.ico", "img/logo.png", "./index.js"]
        );
        assert_eq!(refs[1].raw, "favicon.ico?x=1");
    }

    #[test]
    fn test_local_path() {
        assert_eq!(local_path("pkg/app.js?v=1#x"), Some("pkg/app.js"));
        assert_eq!(local_path("https://a.b/c.js"), None);
        assert_eq!(local_path("mailto:x@y"), None);
        assert_eq!(local_path("#top"), None);
        assert_eq!(local_path("  "), None);
        assert_eq!(local_path("dir/a:b.png"), Some("dir/a:b.png"));
    }

    #[test]
    fn test_rewrite_only_known_values() {
        let mut map = FxHashMap::default();
        map.insert("./index.js".to_string(), "/index.js?v=abc".to_string());
        map.insert("img/logo.png".to_string(), "/img/logo.png".to_string());

        let out = rewrite(PAGE, &map);
        assert!(out.contains(r#"src="/index.js?v=abc""#));
        assert!(out.contains(r#"src="/img/logo.png""#));
        assert!(out.contains(r#"href="about.html""#));
    }

    #[test]
    fn test_rewrite_single_and_unquoted() {
        let mut map = FxHashMap::default();
        map.insert("a.js".to_string(), "/a.js".to_string());
        assert_eq!(
            rewrite("<script src='a.js'></script><script src=a.js></script>", &map),
            r#"<script src="/a.js"></script><script src="/a.js"></script>"#
        );
    }

    #[test]
    fn test_rewrite_ignores_prefixed_attributes() {
        let mut map = FxHashMap::default();
        map.insert("a.js".to_string(), "/a.js".to_string());
        assert_eq!(
            rewrite(r#"<img data-src="a.js" src="a.js">"#, &map),
            r#"<img data-src="a.js" src="/a.js">"#
        );
    }
}
