//! Development server with live reload support.
//!
//! Serves the bundled output directory under the public URL prefix, either
//! on its own listen loop or as middleware in front of a host app
//! (see [`MountMode`](crate::core::MountMode)).

mod content;
mod lifecycle;
mod middleware;
mod path;
mod response;

pub use middleware::DevMiddleware;

use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use anyhow::{Context, Result};
use crossbeam::channel;
use tiny_http::{Method, Request, Server};

use crate::bundler::Bundler;
use crate::config::BuildConfig;
use crate::core::{MountMode, ServeError};
use crate::embed::serve::HOTRELOAD_PATH;
use crate::utils::mime;
use crate::{debug, log};
use response::Reply;

/// Worker threads handling requests
const REQUEST_THREADS: usize = 4;

/// Request handler shared by both mount modes.
pub struct DevServer {
    config: Arc<BuildConfig>,
    /// Bound websocket port, `0` until the listener is up
    ws_port: AtomicU16,
}

/// The parts of a request routing depends on.
#[derive(Debug, Clone)]
pub struct RequestInfo<'a> {
    pub method: Method,
    pub url: &'a str,
    pub accept_gzip: bool,
}

impl<'a> RequestInfo<'a> {
    fn of(request: &'a Request) -> Self {
        let accept_gzip = request
            .headers()
            .iter()
            .find(|h| h.field.as_str().as_str().eq_ignore_ascii_case("accept-encoding"))
            .is_some_and(|h| content::accepts_gzip(h.value.as_str()));

        Self {
            method: request.method().clone(),
            url: request.url(),
            accept_gzip,
        }
    }
}

impl DevServer {
    pub fn new(config: Arc<BuildConfig>) -> Self {
        Self {
            config,
            ws_port: AtomicU16::new(0),
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Record the websocket port the reload listener actually bound.
    pub fn set_ws_port(&self, port: u16) {
        self.ws_port.store(port, Ordering::Relaxed);
    }

    /// Websocket port, if live reload is available.
    fn live_reload_port(&self) -> Option<u16> {
        let port = self.ws_port.load(Ordering::Relaxed);
        (self.config.watch && port != 0).then_some(port)
    }

    /// Whether `url` belongs to the dev server rather than the host app.
    pub fn claims(&self, url: &str) -> bool {
        let path = url_path(url);
        path == HOTRELOAD_PATH || self.strip_prefix(path).is_some()
    }

    /// Path relative to the public URL prefix.
    fn strip_prefix<'u>(&self, path: &'u str) -> Option<&'u str> {
        let prefix = self.config.public_url.as_str();
        if let Some(rest) = path.strip_prefix(prefix) {
            return Some(rest);
        }
        // `/app` for a `/app/` prefix
        (path == prefix.trim_end_matches('/')).then_some("")
    }

    /// Route a request to a reply.
    pub fn respond(&self, request: &RequestInfo<'_>, ready: bool) -> Reply {
        if !matches!(request.method, Method::Get | Method::Head) {
            return Reply::method_not_allowed();
        }

        let path = url_path(request.url);
        if path == HOTRELOAD_PATH
            && let Some(port) = self.live_reload_port()
        {
            return Reply::hotreload_js(port);
        }

        let Some(rest) = self.strip_prefix(path) else {
            return Reply::not_found();
        };

        if !ready {
            return Reply::building(self.config.mode.label());
        }

        let Some(file) = path::resolve_path(rest, &self.config.out_dir, &self.config.out_file)
        else {
            return Reply::not_found();
        };

        let body = match std::fs::read(&file) {
            Ok(body) => body,
            Err(e) => {
                log!("serve"; "failed to read {}: {}", file.display(), e);
                return Reply::internal_error();
            }
        };

        let content_type = mime::from_path(&file);
        let body =
            content::maybe_inject_hotreload(body, content_type, self.live_reload_port().is_some());
        self.encode(request, content_type, body)
    }

    /// gzip in production when the client accepts it.
    fn encode(&self, request: &RequestInfo<'_>, content_type: &'static str, body: Vec<u8>) -> Reply {
        if !self.config.compress() || !mime::is_compressible(content_type) {
            return Reply::file(content_type, body);
        }
        if !request.accept_gzip {
            return Reply::file(content_type, body).with_header("Vary", "Accept-Encoding");
        }
        match content::gzip(&body) {
            Ok(encoded) => Reply::file(content_type, encoded)
                .with_header("Content-Encoding", "gzip")
                .with_header("Vary", "Accept-Encoding"),
            Err(e) => {
                debug!("serve"; "gzip failed, sending uncompressed: {}", e);
                Reply::file(content_type, body)
            }
        }
    }

    /// Answer a request on the current thread.
    pub fn handle(&self, request: Request) -> Result<()> {
        if crate::core::is_shutdown() {
            return Reply::unavailable().send(request);
        }
        let reply = self.respond(&RequestInfo::of(&request), crate::core::is_ready());
        debug!("serve"; "{} {} -> {}", request.method(), request.url(), reply.status);
        reply.send(request)
    }
}

/// URL without query string or fragment.
fn url_path(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    handler: Arc<DevServer>,
    shutdown_rx: channel::Receiver<()>,
}

/// Bind the HTTP listener on the configured address.
///
/// Binding happens before any build so a taken port fails fast. There is no
/// retry on another port.
pub fn bind_server(config: Arc<BuildConfig>) -> Result<BoundServer, ServeError> {
    let addr = config.address;
    let server = Server::http(addr).map_err(|source| ServeError::Bind { addr, source })?;
    let server = Arc::new(server);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    crate::core::register_server(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{}{}", addr, config.public_url);

    Ok(BoundServer {
        server,
        handler: Arc::new(DevServer::new(config)),
        shutdown_rx,
    })
}

impl BoundServer {
    /// Start watching and serve until shutdown (blocking).
    pub fn run(self, bundler: Bundler) -> Result<()> {
        let actors = lifecycle::spawn_actors(
            Arc::clone(&self.handler),
            Arc::new(bundler),
            self.shutdown_rx,
        )?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(REQUEST_THREADS)
            .build()
            .context("failed to create request thread pool")?;

        match self.handler.config().mount {
            MountMode::Standalone => run_standalone(&self.server, &pool, &self.handler),
            MountMode::Embedded => {
                middleware::run_host(&self.server, &pool, DevMiddleware::new(self.handler))
            }
        }

        lifecycle::wait_for_shutdown(actors);
        Ok(())
    }
}

fn run_standalone(server: &Server, pool: &rayon::ThreadPool, handler: &Arc<DevServer>) {
    for request in server.incoming_requests() {
        let handler = Arc::clone(handler);
        pool.spawn(move || {
            if let Err(e) = handler.handle(request) {
                log!("serve"; "request error: {e}");
            }
        });
    }
}

#[cfg(test)]
mod tests;
