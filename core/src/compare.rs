//! Response equivalence between two independently produced responses.
//!
//! Status codes must match, `Content-Type` media types must match (parameters
//! such as `charset` and header order are ignored), and bodies must match:
//! structurally for JSON, byte-for-byte for everything else.

use serde_json::Value;
use thiserror::Error;

use crate::http::HttpResponse;
use crate::response::APPLICATION_JSON;

#[derive(Debug, Error, PartialEq)]
pub enum Mismatch {
    #[error("status differs: expected {expected}, got {actual}")]
    Status { expected: u16, actual: u16 },

    #[error("content type differs: expected {expected:?}, got {actual:?}")]
    ContentType {
        expected: Option<String>,
        actual: Option<String>,
    },

    #[error("body differs: expected {expected:?}, got {actual:?}")]
    Body { expected: String, actual: String },
}

/// Full comparison: status, media type and body.
pub fn equivalent(expected: &HttpResponse, actual: &HttpResponse) -> Result<(), Mismatch> {
    equivalent_head(expected, actual)?;

    let same_body = if media_type(expected).as_deref() == Some(APPLICATION_JSON) {
        match (
            serde_json::from_slice::<Value>(&expected.body),
            serde_json::from_slice::<Value>(&actual.body),
        ) {
            (Ok(a), Ok(b)) => a == b,
            _ => expected.body == actual.body,
        }
    } else {
        expected.body == actual.body
    };

    if same_body {
        Ok(())
    } else {
        Err(Mismatch::Body {
            expected: expected.body_text(),
            actual: actual.body_text(),
        })
    }
}

/// Status and media type only, for responses whose body is non-normative.
pub fn equivalent_head(expected: &HttpResponse, actual: &HttpResponse) -> Result<(), Mismatch> {
    if expected.status != actual.status {
        return Err(Mismatch::Status {
            expected: expected.status,
            actual: actual.status,
        });
    }
    let (a, b) = (media_type(expected), media_type(actual));
    if a != b {
        return Err(Mismatch::ContentType {
            expected: a,
            actual: b,
        });
    }
    Ok(())
}

/// `Content-Type` without parameters, lower-cased.
pub fn media_type(response: &HttpResponse) -> Option<String> {
    response.content_type().map(|value| {
        value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, content_type: &str, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: vec![("content-type".to_string(), content_type.to_string())],
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn json_ignores_key_order() {
        let a = response(200, "application/json", r#"{"foo":"bar","baz":"qux"}"#);
        let b = response(200, "application/json", r#"{"baz":"qux","foo":"bar"}"#);
        assert_eq!(equivalent(&a, &b), Ok(()));
    }

    #[test]
    fn text_is_byte_exact() {
        let a = response(200, "text/plain", "hi");
        let b = response(200, "text/plain", "hi\n");
        assert!(matches!(equivalent(&a, &b), Err(Mismatch::Body { .. })));
    }

    #[test]
    fn charset_and_header_case_are_ignored() {
        let a = response(200, "text/html", "<p/>");
        let mut b = response(200, "Text/HTML; charset=utf-8", "<p/>");
        b.headers[0].0 = "Content-Type".to_string();
        b.headers.insert(0, ("x-extra".to_string(), "1".to_string()));
        assert_eq!(equivalent(&a, &b), Ok(()));
    }

    #[test]
    fn status_is_checked_first() {
        let a = response(404, "text/plain", "Not found");
        let b = response(200, "text/plain", "Not found");
        assert_eq!(
            equivalent(&a, &b),
            Err(Mismatch::Status { expected: 404, actual: 200 })
        );
    }

    #[test]
    fn head_comparison_skips_body() {
        let a = response(404, "text/plain", "Not found");
        let b = response(404, "text/plain; charset=utf-8", "Cannot GET /nope");
        assert_eq!(equivalent_head(&a, &b), Ok(()));
        assert!(equivalent(&a, &b).is_err());
    }

    #[test]
    fn missing_content_type_differs_from_present() {
        let a = response(200, "text/plain", "hi");
        let b = HttpResponse { status: 200, headers: Vec::new(), body: b"hi".to_vec() };
        assert!(matches!(equivalent(&a, &b), Err(Mismatch::ContentType { .. })));
    }
}
