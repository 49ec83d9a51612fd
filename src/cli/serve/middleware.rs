//! Embedded mount: the dev server in front of a host application.

use std::sync::Arc;

use tiny_http::{Request, Server};

use super::DevServer;
use super::response::Reply;
use crate::{debug, log};

/// Claims requests under the public URL prefix and the live reload script,
/// hands everything else back to the host.
#[derive(Clone)]
pub struct DevMiddleware {
    server: Arc<DevServer>,
}

impl DevMiddleware {
    pub fn new(server: Arc<DevServer>) -> Self {
        Self { server }
    }

    /// Serve `request` if it is ours, otherwise return it untouched.
    pub fn handle(&self, request: Request) -> Option<Request> {
        if !self.server.claims(request.url()) {
            return Some(request);
        }
        if let Err(e) = self.server.handle(request) {
            log!("serve"; "request error: {e}");
        }
        None
    }
}

/// Minimal host app: everything the middleware passes through is a 404.
pub(super) fn run_host(server: &Server, pool: &rayon::ThreadPool, middleware: DevMiddleware) {
    for request in server.incoming_requests() {
        let middleware = middleware.clone();
        pool.spawn(move || {
            let Some(request) = middleware.handle(request) else {
                return;
            };
            debug!("host"; "{} {} -> 404", request.method(), request.url());
            if let Err(e) = Reply::not_found().send(request) {
                log!("host"; "request error: {e}");
            }
        });
    }
}
