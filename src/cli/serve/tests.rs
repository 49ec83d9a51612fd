use std::fs;
use std::io::Read;
use std::sync::Arc;

use flate2::read::GzDecoder;
use tempfile::TempDir;
use tiny_http::Method;

use super::{DevServer, RequestInfo};
use crate::cli::Cli;
use crate::config::{BuildConfig, Env};

const INDEX: &str = "<html><body><script src=\"/app.js\"></script></body></html>";

fn fixture(mode: &str, public_url: &str) -> (TempDir, DevServer) {
    let dir = TempDir::new().unwrap();
    let dist = dir.path().join("dist");
    fs::create_dir_all(dist.join("assets")).unwrap();
    fs::write(dist.join("index.html"), INDEX).unwrap();
    fs::write(dist.join("app.js"), "console.log('app');".repeat(20)).unwrap();
    fs::write(dist.join("app_bg.wasm"), [0u8, 97, 115, 109]).unwrap();
    fs::write(dist.join("assets/index.html"), "<p>assets</p>").unwrap();
    fs::write(dir.path().join("secret.txt"), "secret").unwrap();

    let cli = Cli {
        mode: Some(mode.to_string()),
        root: Some(dir.path().to_path_buf()),
        public_url: Some(public_url.to_string()),
        ..Default::default()
    };
    let config = BuildConfig::load(&cli, &Env::default()).unwrap();
    (dir, DevServer::new(Arc::new(config)))
}

fn get(url: &str) -> RequestInfo<'_> {
    RequestInfo {
        method: Method::Get,
        url,
        accept_gzip: false,
    }
}

fn body(reply: &super::Reply) -> String {
    String::from_utf8_lossy(&reply.body).into_owned()
}

#[test]
fn test_only_get_and_head() {
    let (_dir, server) = fixture("development", "/");

    let post = RequestInfo {
        method: Method::Post,
        ..get("/")
    };
    assert_eq!(server.respond(&post, true).status, 405);

    let head = RequestInfo {
        method: Method::Head,
        ..get("/")
    };
    assert_eq!(server.respond(&head, true).status, 200);
}

#[test]
fn test_building_page_until_ready() {
    let (_dir, server) = fixture("development", "/");

    let reply = server.respond(&get("/"), false);
    assert_eq!(reply.status, 503);
    assert!(body(&reply).contains("development"));
}

#[test]
fn test_serves_files_and_directory_index() {
    let (_dir, server) = fixture("development", "/");

    let reply = server.respond(&get("/app.js?v=1234abcd"), true);
    assert_eq!(reply.status, 200);
    assert!(reply.content_type.starts_with("text/javascript"));

    let reply = server.respond(&get("/app_bg.wasm"), true);
    assert_eq!(reply.content_type, "application/wasm");
    assert_eq!(reply.body, vec![0u8, 97, 115, 109]);

    let reply = server.respond(&get("/assets/"), true);
    assert_eq!(body(&reply), "<p>assets</p>");
}

#[test]
fn test_spa_fallback_and_not_found() {
    let (_dir, server) = fixture("development", "/");

    let reply = server.respond(&get("/users/42"), true);
    assert_eq!(reply.status, 200);
    assert!(body(&reply).contains("/app.js"));

    assert_eq!(server.respond(&get("/missing.js"), true).status, 404);
}

#[test]
fn test_traversal_rejected() {
    let (_dir, server) = fixture("development", "/");

    assert_eq!(server.respond(&get("/../secret.txt"), true).status, 404);
    assert_eq!(server.respond(&get("/%2e%2e/secret.txt"), true).status, 404);
}

#[test]
fn test_hotreload_only_with_live_reload() {
    let (_dir, server) = fixture("development", "/");

    // No websocket listener yet: no script, no injection
    assert_eq!(server.respond(&get("/__wasmserve/hotreload.js"), true).status, 404);
    assert!(!body(&server.respond(&get("/"), true)).contains("hotreload"));

    server.set_ws_port(35730);
    let reply = server.respond(&get("/__wasmserve/hotreload.js"), true);
    assert_eq!(reply.status, 200);
    assert!(body(&reply).contains("35730"));

    let html = body(&server.respond(&get("/"), true));
    assert!(html.contains(r#"<script src="/__wasmserve/hotreload.js"></script></body>"#));
}

#[test]
fn test_public_url_prefix() {
    let (_dir, server) = fixture("development", "/app/");

    assert!(server.claims("/app/app.js"));
    assert!(server.claims("/app"));
    assert!(server.claims("/__wasmserve/hotreload.js"));
    assert!(!server.claims("/api/users"));
    assert!(!server.claims("/application"));

    assert_eq!(server.respond(&get("/app/app.js"), true).status, 200);
    assert_eq!(server.respond(&get("/app"), true).status, 200);
    assert_eq!(server.respond(&get("/app.js"), true).status, 404);
}

#[test]
fn test_gzip_in_production() {
    let (_dir, server) = fixture("production", "/");

    let request = RequestInfo {
        accept_gzip: true,
        ..get("/app.js")
    };
    let reply = server.respond(&request, true);
    assert_eq!(reply.header("Content-Encoding"), Some("gzip"));
    assert_eq!(reply.header("Vary"), Some("Accept-Encoding"));

    let mut decoded = String::new();
    GzDecoder::new(reply.body.as_slice())
        .read_to_string(&mut decoded)
        .unwrap();
    assert_eq!(decoded, "console.log('app');".repeat(20));

    // Client without gzip support
    let reply = server.respond(&get("/app.js"), true);
    assert_eq!(reply.header("Content-Encoding"), None);
    assert_eq!(reply.header("Vary"), Some("Accept-Encoding"));
}

#[test]
fn test_no_gzip_in_development() {
    let (_dir, server) = fixture("development", "/");

    let request = RequestInfo {
        accept_gzip: true,
        ..get("/app.js")
    };
    let reply = server.respond(&request, true);
    assert_eq!(reply.header("Content-Encoding"), None);
    assert_eq!(reply.header("Vary"), None);
}
