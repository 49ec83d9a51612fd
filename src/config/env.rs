//! Process environment snapshot with `.env` support.
//!
//! Variables already present in the process environment win over the
//! `.env` file; the file never overrides them.

use std::path::Path;

use rustc_hash::FxHashMap;

/// Immutable view of the environment the config is derived from.
#[derive(Debug, Clone, Default)]
pub struct Env {
    vars: FxHashMap<String, String>,
}

impl Env {
    /// Capture process variables merged over `<root>/.env`.
    pub fn capture(root: &Path) -> Self {
        let mut vars = match std::fs::read_to_string(root.join(".env")) {
            Ok(content) => parse_env_file(&content),
            Err(_) => FxHashMap::default(),
        };
        vars.extend(std::env::vars());
        Self { vars }
    }

    /// Build from explicit pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Get a variable, treating whitespace-only values as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

/// Parse `.env` content into key-value pairs.
///
/// Handles `KEY=value`, `export KEY=value`, double quotes (with `\n`, `\t`,
/// `\"` and `\\` escapes), single quotes (literal), `#` comments and inline
/// ` #` comments after unquoted values.
pub fn parse_env_file(content: &str) -> FxHashMap<String, String> {
    let mut vars = FxHashMap::default();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, raw)) = line.split_once('=') else {
            continue;
        };

        let key = key.trim();
        let key = key.strip_prefix("export ").unwrap_or(key).trim();
        if key.is_empty() {
            continue;
        }

        let raw = raw.trim();
        let value = if let Some(rest) = raw.strip_prefix('"') {
            unescape_double_quoted(rest)
        } else if let Some(rest) = raw.strip_prefix('\'') {
            rest.split('\'').next().unwrap_or_default().to_string()
        } else {
            match raw.find(" #") {
                Some(pos) => raw[..pos].trim_end().to_string(),
                None => raw.to_string(),
            }
        };

        vars.insert(key.to_string(), value);
    }

    vars
}

fn unescape_double_quoted(rest: &str) -> String {
    let mut value = String::with_capacity(rest.len());
    let mut chars = rest.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => break,
            '\\' => match chars.next() {
                Some('n') => value.push('\n'),
                Some('t') => value.push('\t'),
                Some('r') => value.push('\r'),
                Some(c @ ('"' | '\\')) => value.push(c),
                Some(other) => {
                    value.push('\\');
                    value.push(other);
                }
                None => value.push('\\'),
            },
            c => value.push(c),
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_file() {
        let vars = parse_env_file(
            "# comment\n\
             SERVER_ADDRESS=8080\n\
             export NODE_ENV=production\n\
             QUOTED=\"a \\\"b\\\"\\n\"\n\
             SINGLE='x # y'\n\
             INLINE=value # trailing\n\
             NOEQUALS\n\
             =orphan\n",
        );

        assert_eq!(vars["SERVER_ADDRESS"], "8080");
        assert_eq!(vars["NODE_ENV"], "production");
        assert_eq!(vars["QUOTED"], "a \"b\"\n");
        assert_eq!(vars["SINGLE"], "x # y");
        assert_eq!(vars["INLINE"], "value");
        assert_eq!(vars.len(), 5);
    }

    #[test]
    fn test_empty_value_is_absent() {
        let env = Env::from_pairs([("SERVER_ADDRESS", "  "), ("NODE_ENV", "production")]);
        assert_eq!(env.get("SERVER_ADDRESS"), None);
        assert_eq!(env.get("NODE_ENV"), Some("production"));
        assert_eq!(env.get("MISSING"), None);
    }

    #[test]
    fn test_capture_reads_dotenv() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".env"),
            "WASMSERVE_TEST_ONLY_FROM_DOTENV=from-file\n",
        )
        .unwrap();

        let env = Env::capture(dir.path());
        assert_eq!(env.get("WASMSERVE_TEST_ONLY_FROM_DOTENV"), Some("from-file"));
    }
}
