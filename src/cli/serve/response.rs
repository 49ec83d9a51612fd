//! HTTP responses.
//!
//! Handlers build a [`Reply`]; only [`Reply::send`] touches tiny_http, so
//! routing can be tested without a socket.

use anyhow::Result;
use tiny_http::{Header, Request, Response, StatusCode};

use crate::utils::mime::types::{HTML, JAVASCRIPT, PLAIN};

#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn new(status: u16, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Look up an extra header (case-insensitive).
    #[cfg(test)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn not_found() -> Self {
        Self::new(404, PLAIN, "404 Not Found")
    }

    pub fn method_not_allowed() -> Self {
        Self::new(405, PLAIN, "405 Method Not Allowed").with_header("Allow", "GET, HEAD")
    }

    /// Served until the first bundle is written. The page polls with HEAD
    /// and reloads once the status stops being 503.
    pub fn building(mode: &'static str) -> Self {
        use crate::embed::serve::{BUILDING_HTML, BuildingVars};

        let body = BUILDING_HTML.render(&BuildingVars { mode });
        Self::new(503, HTML, body).with_header("Retry-After", "1")
    }

    /// Server is shutting down.
    pub fn unavailable() -> Self {
        Self::new(503, PLAIN, "503 Service Unavailable")
    }

    pub fn internal_error() -> Self {
        Self::new(500, PLAIN, "500 Internal Server Error")
    }

    /// Live reload client with the bound websocket port substituted.
    pub fn hotreload_js(ws_port: u16) -> Self {
        use crate::embed::serve::{HOTRELOAD_JS, HotreloadVars};

        Self::new(200, JAVASCRIPT, HOTRELOAD_JS.render(&HotreloadVars { ws_port }))
    }

    pub fn file(content_type: &'static str, body: Vec<u8>) -> Self {
        Self::new(200, content_type, body)
    }

    /// Write the reply. tiny_http drops the body of HEAD responses.
    pub fn send(self, request: Request) -> Result<()> {
        let mut response = Response::from_data(self.body)
            .with_status_code(StatusCode(self.status))
            .with_header(make_header("Content-Type", self.content_type))
            .with_header(make_header("Cache-Control", "no-cache"));
        for (name, value) in &self.headers {
            response = response.with_header(make_header(name, value));
        }
        request.respond(response)?;
        Ok(())
    }
}

fn make_header(key: &str, value: &str) -> Header {
    // Header names are static and values are ASCII we format ourselves
    Header::from_bytes(key, value).expect("valid header")
}
