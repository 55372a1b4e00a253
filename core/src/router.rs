//! Request routing: maps a method and path onto one of the fixed handlers.
//!
//! # Design
//! Routing is an exact match on `(method, path)`. The only decomposition is
//! `/cats/{name}` and `/assets/{name}`, where the remainder after the prefix
//! is a single percent-decoded segment. A segment that does not decode to
//! UTF-8 is a 400. Anything else, including a known path with the wrong
//! method, is `RouteNotFound` and renders as 404.
//!
//! State lives in an explicit [`ServerContext`] handed to [`Router::new`], so
//! tests can run any number of independent routers side by side. Cats and
//! assets are both behind locks, so `route` takes `&self` and one router can
//! serve concurrent requests.

use std::sync::{Arc, PoisonError, RwLock};

use percent_encoding::percent_decode_str;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::assets::{AssetKey, AssetStore, MemoryAssetStore};
use crate::error::{Error, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::response::{render, render_error, render_with_status, Reply};
use crate::types::{sample_cats, Cat};

pub const INDEX_HTML: &str = "<html><body><h1>hello world</h1></body></html>";

/// Everything the handlers read or write.
///
/// Clones share the same cats and assets.
#[derive(Clone)]
pub struct ServerContext {
    pub cats: Arc<RwLock<Vec<Cat>>>,
    pub assets: Arc<dyn AssetStore>,
}

impl ServerContext {
    pub fn new(cats: Vec<Cat>, assets: Arc<dyn AssetStore>) -> Self {
        Self {
            cats: Arc::new(RwLock::new(cats)),
            assets,
        }
    }

    /// Sample cats and an empty in-memory asset store.
    pub fn with_sample_cats() -> Self {
        Self::new(sample_cats(), Arc::new(MemoryAssetStore::new()))
    }
}

impl Default for ServerContext {
    fn default() -> Self {
        Self::new(Vec::new(), Arc::new(MemoryAssetStore::new()))
    }
}

pub struct Router {
    ctx: ServerContext,
}

impl Router {
    pub fn new(ctx: ServerContext) -> Self {
        Self { ctx }
    }

    /// Route one request. Handler errors are rendered here and never escape.
    pub fn route(&self, req: &HttpRequest) -> HttpResponse {
        let response = self
            .dispatch(req)
            .unwrap_or_else(|err| render_error(&err));
        debug!(
            method = %req.method,
            path = %req.path,
            status = response.status,
            "routed request"
        );
        response
    }

    fn dispatch(&self, req: &HttpRequest) -> Result<HttpResponse> {
        use HttpMethod::{Get, Post};

        match (req.method, req.path.as_str()) {
            (Get, "/hi") => return Ok(render(Reply::Text("hi".to_string()))),
            (Get, "/json") => return Ok(render(Reply::Json(json!({"hello": "world"})))),
            (Get, "/404") => return Ok(render(Reply::NotFound)),
            (Get, "/") => return Ok(render(Reply::Html(INDEX_HTML.to_string()))),
            (Get, "/queryParams") => return Ok(render(Reply::Json(echo_query(req)))),
            (Get, "/cats") => return self.list_cats().map(render),
            (Post, "/cats") => {
                return self
                    .add_cat(&req.body)
                    .map(|reply| render_with_status(201, reply))
            }
            (Post, "/greet") => return greet(req).map(render),
            _ => {}
        }

        if let Some(raw) = tail_segment(&req.path, "/cats/") {
            if req.method == Get {
                return self.find_cat(&decode_segment(raw)?).map(render);
            }
        } else if let Some(raw) = tail_segment(&req.path, "/assets/") {
            match req.method {
                Get => return self.fetch_asset(&decode_segment(raw)?).map(render),
                Post => {
                    let key = self.ctx.assets.store(&decode_segment(raw)?, req.body.clone())?;
                    return Ok(render_with_status(201, Reply::Text(key.to_string())));
                }
                _ => {}
            }
        }

        Err(Error::RouteNotFound {
            method: req.method.to_string(),
            path: req.path.clone(),
        })
    }

    fn list_cats(&self) -> Result<Reply> {
        let cats = self.ctx.cats.read().unwrap_or_else(PoisonError::into_inner);
        Ok(Reply::Json(serde_json::to_value(&*cats)?))
    }

    /// Append a cat parsed from a JSON body and echo it back.
    fn add_cat(&self, body: &[u8]) -> Result<Reply> {
        let cat: Cat = serde_json::from_slice(body).map_err(|err| {
            debug!(%err, "rejected cat body");
            Error::InvalidBody("cat")
        })?;
        let reply = Reply::Json(serde_json::to_value(&cat)?);
        self.ctx
            .cats
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(cat);
        Ok(reply)
    }

    fn find_cat(&self, name: &str) -> Result<Reply> {
        let cats = self.ctx.cats.read().unwrap_or_else(PoisonError::into_inner);
        let cat = cats
            .iter()
            .find(|cat| cat.name == name)
            .ok_or_else(|| Error::LookupNotFound {
                kind: "cat",
                key: name.to_string(),
            })?;
        Ok(Reply::Json(serde_json::to_value(cat)?))
    }

    fn fetch_asset(&self, name: &str) -> Result<Reply> {
        let bytes = self.ctx.assets.get(&AssetKey::from_name(name))?;
        Ok(Reply::Binary(bytes))
    }
}

fn greet(req: &HttpRequest) -> Result<Reply> {
    let name = req.query_param("name").ok_or(Error::MissingParameter("name"))?;
    Ok(Reply::Text(format!("Hello, {name}!")))
}

/// Echo the query as a JSON object. A name seen once maps to its value; a
/// repeated name maps to an array of its values, placed where the name first
/// appeared.
fn echo_query(req: &HttpRequest) -> Value {
    let mut object = Map::new();
    for (name, value) in &req.query {
        match object.get_mut(name) {
            None => {
                object.insert(name.clone(), Value::String(value.clone()));
            }
            Some(Value::Array(values)) => values.push(Value::String(value.clone())),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value.clone())]);
            }
        }
    }
    Value::Object(object)
}

/// Raw single segment after `prefix`, or `None` when the path does not
/// have exactly one non-empty segment there.
fn tail_segment<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() || rest.contains('/') {
        return None;
    }
    Some(rest)
}

fn decode_segment(raw: &str) -> Result<String> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| Error::InvalidPathSegment("name"))
}
