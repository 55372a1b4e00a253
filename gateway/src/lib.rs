//! Network host for the compatibility core.
//!
//! `serve` puts a core `Router` behind axum; `upload` pushes a directory of
//! assets into a running gateway, one task per file.

pub mod logging;
pub mod serve;
pub mod transport;
pub mod upload;
