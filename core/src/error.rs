//! Error types for the compatibility adapter.
//!
//! # Design
//! One enum covers the router, the asset store and the asset client. The
//! router never lets an `Error` escape: `Error::status` decides which HTTP
//! status it becomes. Asset store and client callers get the `Error` itself
//! and choose their own retry policy.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// No handler is registered for this method and path.
    #[error("no route for {method} {path}")]
    RouteNotFound { method: String, path: String },

    /// A structured lookup (e.g. cat by name) matched nothing.
    #[error("{kind} not found: {key}")]
    LookupNotFound { kind: &'static str, key: String },

    /// `get` was called with a key that was never stored.
    #[error("asset not found: {0}")]
    AssetNotFound(String),

    /// A required query parameter was absent.
    #[error("Missing query parameter: {0}")]
    MissingParameter(&'static str),

    /// A request body could not be parsed as the expected type.
    #[error("Invalid {0} body")]
    InvalidBody(&'static str),

    /// A path segment did not percent-decode to UTF-8.
    #[error("Invalid URL: Invalid UTF-8 in `{0}`")]
    InvalidPathSegment(&'static str),

    /// The method token is outside the supported set.
    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    /// The asset store could not be reached at all.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The upstream answered with a status the caller did not expect.
    #[error("HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// Read-back returned a different number of bytes than were stored.
    #[error("stored {expected} bytes but read back {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A local file could not be read before upload.
    #[error("cannot read {name}: {reason}")]
    Unreadable { name: String, reason: String },

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// HTTP status this error maps to when it reaches the router boundary.
    pub fn status(&self) -> u16 {
        match self {
            Error::RouteNotFound { .. } | Error::LookupNotFound { .. } | Error::AssetNotFound(_) => {
                404
            }
            Error::MissingParameter(_) | Error::InvalidBody(_) | Error::InvalidPathSegment(_) => {
                400
            }
            Error::UnsupportedMethod(_) => 404,
            Error::UpstreamUnavailable(_) => 502,
            Error::LengthMismatch { .. } => 502,
            Error::UnexpectedStatus { .. } | Error::Unreadable { .. } | Error::Json(_) => 500,
        }
    }
}
