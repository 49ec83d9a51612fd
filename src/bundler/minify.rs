//! Production minification for JS and CSS assets.
//!
//! Uses oxc for JavaScript and lightningcss for CSS. A source that fails to
//! parse is emitted unminified.

use std::path::Path;

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

/// Minify an ES module.
pub fn minify_js(source: &str) -> Option<String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
    if !ret.errors.is_empty() {
        return None;
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Some(code)
}

pub fn minify_css(source: &str) -> Option<String> {
    let stylesheet = StyleSheet::parse(source, ParserOptions::default()).ok()?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .ok()?;
    Some(result.code)
}

/// Minify `content` by the extension of `path`.
///
/// `None` when the type is not minifiable or the source failed to parse.
pub fn minify_by_ext(path: &Path, content: &[u8]) -> Option<Vec<u8>> {
    let ext = path.extension()?.to_str()?;
    let source = std::str::from_utf8(content).ok()?;
    let minified = match ext {
        "js" | "mjs" => minify_js(source),
        "css" => minify_css(source),
        _ => return None,
    };
    if minified.is_none() {
        crate::debug!("bundle"; "minify failed, keeping source: {}", path.display());
    }
    minified.map(String::into_bytes)
}
