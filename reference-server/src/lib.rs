use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, Method, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const INDEX_HTML: &str = "<html><body><h1>hello world</h1></body></html>";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cat {
    pub name: String,
    pub age: u32,
}

pub type Db = Arc<RwLock<HashMap<String, Vec<u8>>>>;

#[derive(Clone)]
pub struct AppState {
    pub cats: Arc<RwLock<Vec<Cat>>>,
    pub assets: Db,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            cats: Arc::new(RwLock::new(vec![
                Cat { name: "Sardine".to_string(), age: 7 },
                Cat { name: "Olive".to_string(), age: 4 },
            ])),
            assets: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

pub fn app() -> Router {
    app_with_state(AppState::default())
}

pub fn app_with_state(state: AppState) -> Router {
    Router::new()
        .route("/hi", get(hi))
        .route("/json", get(hello_json))
        .route("/404", get(not_found_route))
        .route("/", get(index))
        .route("/queryParams", get(query_params))
        .route("/cats", get(list_cats).post(add_cat))
        .route("/cats/{name}", get(get_cat))
        .route("/greet", post(greet))
        .route("/assets/{name}", get(get_asset).post(store_asset))
        .fallback(cannot)
        .method_not_allowed_fallback(cannot)
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn text(status: StatusCode, body: impl Into<String>) -> Response {
    let body: String = body.into();
    (status, [(header::CONTENT_TYPE, "text/plain")], body).into_response()
}

async fn hi() -> Response {
    text(StatusCode::OK, "hi")
}

async fn hello_json() -> Json<Value> {
    Json(serde_json::json!({ "hello": "world" }))
}

async fn not_found_route() -> Response {
    text(StatusCode::NOT_FOUND, "Not found")
}

async fn index() -> Response {
    ([(header::CONTENT_TYPE, "text/html")], Html(INDEX_HTML)).into_response()
}

/// Names seen once map to a string, repeated names to an array of strings.
async fn query_params(Query(pairs): Query<Vec<(String, String)>>) -> Json<Value> {
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for (name, value) in pairs {
        match grouped.iter_mut().find(|(n, _)| *n == name) {
            Some((_, values)) => values.push(value),
            None => grouped.push((name, vec![value])),
        }
    }
    let object: Map<String, Value> = grouped
        .into_iter()
        .map(|(name, mut values)| {
            let value = if values.len() == 1 {
                Value::String(values.remove(0))
            } else {
                Value::Array(values.into_iter().map(Value::String).collect())
            };
            (name, value)
        })
        .collect();
    Json(Value::Object(object))
}

async fn list_cats(State(state): State<AppState>) -> Json<Vec<Cat>> {
    let cats = state.cats.read().await.clone();
    Json(cats)
}

/// Parses the body by hand so a bad body is a plain-text 400 rather than
/// axum's `Json` rejection.
async fn add_cat(State(state): State<AppState>, body: Bytes) -> Response {
    match serde_json::from_slice::<Cat>(&body) {
        Ok(cat) => {
            state.cats.write().await.push(cat.clone());
            (StatusCode::CREATED, Json(cat)).into_response()
        }
        Err(_) => text(StatusCode::BAD_REQUEST, "Invalid cat body"),
    }
}

async fn get_cat(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Cat>, Response> {
    let cats = state.cats.read().await;
    cats.iter()
        .find(|cat| cat.name == name)
        .cloned()
        .map(Json)
        .ok_or_else(|| text(StatusCode::NOT_FOUND, "Not found"))
}

async fn greet(Query(pairs): Query<Vec<(String, String)>>) -> Response {
    match pairs.into_iter().find(|(k, _)| k == "name") {
        Some((_, name)) => text(StatusCode::OK, format!("Hello, {name}!")),
        None => text(StatusCode::BAD_REQUEST, "Missing query parameter: name"),
    }
}

async fn get_asset(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let assets = state.assets.read().await;
    match assets.get(&name) {
        Some(bytes) => (
            [(header::CONTENT_TYPE, "application/octet-stream")],
            bytes.clone(),
        )
            .into_response(),
        None => text(StatusCode::NOT_FOUND, "Not found"),
    }
}

async fn store_asset(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Response {
    state.assets.write().await.insert(name.clone(), body.to_vec());
    text(StatusCode::CREATED, name)
}

/// Express-style default for anything unmatched, including a known path
/// requested with the wrong method.
async fn cannot(method: Method, uri: Uri) -> Response {
    text(StatusCode::NOT_FOUND, format!("Cannot {method} {}", uri.path()))
}
