//! Hosts a core `Router` behind axum.
//!
//! A single fallback handler receives every request, converts it into a core
//! `HttpRequest`, routes it and converts the `HttpResponse` back. Axum does
//! no routing of its own here.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use compat_core::{response::render_error, HttpMethod, HttpRequest, HttpResponse, Router};
use tokio::net::TcpListener;
use tracing::{info, trace, warn, Level};

pub fn app(router: Arc<Router>) -> axum::Router {
    axum::Router::new()
        .fallback(dispatch)
        .layer(DefaultBodyLimit::disable())
        .with_state(router)
}

pub async fn run(listener: TcpListener, router: Arc<Router>) -> Result<(), std::io::Error> {
    axum::serve(listener, app(router))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn dispatch(
    State(router): State<Arc<Router>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let response = match method.as_str().parse::<HttpMethod>() {
        Ok(parsed) => {
            let target = uri.path_and_query().map_or("/", |pq| pq.as_str());
            let request = HttpRequest::from_target(parsed, target, convert_headers(&headers), body.to_vec());
            router.route(&request)
        }
        Err(err) => render_error(&err),
    };
    info!(%method, %uri, status = response.status, bytes = response.body.len(), "request");
    if tracing::enabled!(Level::TRACE) {
        trace!(wire = %String::from_utf8_lossy(&response.to_bytes()), "response");
    }
    into_axum(response)
}

fn convert_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            let value = value.to_str().ok()?;
            Some((name.as_str().to_string(), value.to_string()))
        })
        .collect()
}

fn into_axum(response: HttpResponse) -> Response {
    let mut builder = Response::builder().status(response.status);
    for (name, value) in &response.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder.body(Body::from(response.body)).unwrap_or_else(|err| {
        warn!(error = %err, "dropping malformed response");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}
