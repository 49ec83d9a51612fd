//! Response body transforms: live reload injection and gzip.

use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;

/// Inject the live reload `<script>` tag into HTML bodies.
pub fn maybe_inject_hotreload(body: Vec<u8>, content_type: &str, live_reload: bool) -> Vec<u8> {
    if live_reload && content_type.starts_with("text/html") {
        inject_before_body_end(&body, crate::embed::serve::hotreload_tag().as_bytes())
    } else {
        body
    }
}

/// Insert `snippet` before the last `</body>`, or append it.
fn inject_before_body_end(content: &[u8], snippet: &[u8]) -> Vec<u8> {
    const PATTERN: &[u8] = b"</body>";

    let pos = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
        .unwrap_or(content.len());

    let mut result = Vec::with_capacity(content.len() + snippet.len());
    result.extend_from_slice(&content[..pos]);
    result.extend_from_slice(snippet);
    result.extend_from_slice(&content[pos..]);
    result
}

/// Whether an `Accept-Encoding` value admits gzip.
pub fn accepts_gzip(accept_encoding: &str) -> bool {
    accept_encoding.split(',').any(|item| {
        let mut parts = item.split(';');
        let coding = parts.next().unwrap_or("").trim();
        if !(coding.eq_ignore_ascii_case("gzip") || coding == "*") {
            return false;
        }
        // `q=0` means "not acceptable"
        !parts.any(|p| {
            p.trim()
                .strip_prefix("q=")
                .and_then(|q| q.trim().parse::<f32>().ok())
                .is_some_and(|q| q <= 0.0)
        })
    })
}

pub fn gzip(body: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(body.len() / 2), Compression::default());
    encoder.write_all(body)?;
    encoder.finish()
}
