//! Stateless HTTP request builder and response parser for the asset routes.
//!
//! # Design
//! `AssetClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`. The
//! caller executes the round-trip, so the same client drives a live server,
//! an in-process `Router`, or a canned response in a test.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::assets::AssetKey;
use crate::error::{Error, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::response::OCTET_STREAM;

/// Characters escaped in a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, Clone)]
pub struct AssetClient {
    base_url: String,
}

impl AssetClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Absolute URL for a request built by this client.
    pub fn url(&self, req: &HttpRequest) -> String {
        format!("{}{}", self.base_url, req.target())
    }

    pub fn build_store(&self, name: &str, content: Vec<u8>) -> HttpRequest {
        HttpRequest::new(HttpMethod::Post, &asset_path(name))
            .with_header("content-type", OCTET_STREAM)
            .with_body(content)
    }

    pub fn build_get(&self, key: &AssetKey) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, &asset_path(key.as_str()))
    }

    pub fn parse_store(&self, response: HttpResponse) -> Result<AssetKey> {
        check_status(&response, 201)?;
        Ok(AssetKey::from_name(&response.body_text()))
    }

    pub fn parse_get(&self, response: HttpResponse) -> Result<Vec<u8>> {
        check_status(&response, 200)?;
        Ok(response.body)
    }
}

fn asset_path(name: &str) -> String {
    format!("/assets/{}", utf8_percent_encode(name, SEGMENT))
}

/// Map non-success status codes to the appropriate `Error` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<()> {
    if response.status == expected {
        return Ok(());
    }
    if response.status == 404 {
        return Err(Error::AssetNotFound(response.body_text()));
    }
    Err(Error::UnexpectedStatus {
        status: response.status,
        body: response.body_text(),
    })
}
