//! HTTP compatibility adapter core.
//!
//! # Overview
//! Maps an inbound request onto a fixed set of named handlers and renders the
//! result as a response that a conventional web server would also produce:
//! same status, same `Content-Type`, same body. Nothing here touches the
//! network (host-does-IO pattern); the gateway binary and the tests own the
//! sockets.
//!
//! # Design
//! - `Router` owns a `ServerContext` (cats plus an `AssetStore`) passed in at
//!   construction, so independent routers never share state.
//! - Handlers return a `Reply`; `response::render` is the only place status
//!   codes and content types are decided.
//! - `AssetClient` builds and parses asset requests for the upload workflow.
//! - `compare` defines when two responses count as the same, used by the
//!   differential tests against the reference server.

pub mod assets;
pub mod client;
pub mod compare;
pub mod error;
pub mod http;
pub mod response;
pub mod router;
pub mod types;

pub use assets::{AssetKey, AssetStore, MemoryAssetStore};
pub use client::AssetClient;
pub use compare::{equivalent, equivalent_head, Mismatch};
pub use error::{Error, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use response::{render, render_with_status, Reply};
pub use router::{Router, ServerContext};
pub use types::Cat;
