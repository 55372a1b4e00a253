//! Response synthesis: turns a handler's logical result into an
//! `HttpResponse`.
//!
//! Handlers never format status lines or headers themselves. They return a
//! [`Reply`] (or an [`Error`]) and [`render`] maps it to status, content type
//! and body. The mapping is a plain `match` over a closed enum.

use serde_json::Value;

use crate::error::Error;
use crate::http::HttpResponse;

pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_HTML: &str = "text/html";
pub const APPLICATION_JSON: &str = "application/json";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Body of the explicit `/404` route and of every not-found outcome.
pub const NOT_FOUND_BODY: &str = "Not found";

/// Logical result of a handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Json(Value),
    Html(String),
    Binary(Vec<u8>),
    NotFound,
}

/// Render with the default status for the variant (404 for `NotFound`, 200
/// otherwise).
pub fn render(reply: Reply) -> HttpResponse {
    render_with_status(200, reply)
}

/// Render with an explicit status. `NotFound` always renders as 404.
pub fn render_with_status(status: u16, reply: Reply) -> HttpResponse {
    let (status, content_type, body) = match reply {
        Reply::Text(text) => (status, TEXT_PLAIN, text.into_bytes()),
        // Serializing a `Value` cannot fail: its map keys are always strings.
        Reply::Json(value) => (status, APPLICATION_JSON, value.to_string().into_bytes()),
        Reply::Html(html) => (status, TEXT_HTML, html.into_bytes()),
        Reply::Binary(bytes) => (status, OCTET_STREAM, bytes),
        Reply::NotFound => (404, TEXT_PLAIN, NOT_FOUND_BODY.as_bytes().to_vec()),
    };
    HttpResponse {
        status,
        headers: vec![("content-type".to_string(), content_type.to_string())],
        body,
    }
}

/// Render an error that reached the router boundary.
pub fn render_error(err: &Error) -> HttpResponse {
    match err.status() {
        404 => render(Reply::NotFound),
        status => render_with_status(status, Reply::Text(err.to_string())),
    }
}
