use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use reference_server::{app, app_with_state, AppState, Cat, INDEX_HTML};
use tower::ServiceExt;

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn content_type(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(http::header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- static routes ---

#[tokio::test]
async fn hi_is_plain_text() {
    let resp = app().oneshot(get("/hi")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(content_type(&resp), "text/plain");
    assert_eq!(body_bytes(resp).await, "hi");
}

#[tokio::test]
async fn json_says_hello_world() {
    let resp = app().oneshot(get("/json")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(content_type(&resp), "application/json");
    let value: serde_json::Value = body_json(resp).await;
    assert_eq!(value, serde_json::json!({"hello": "world"}));
}

#[tokio::test]
async fn explicit_404() {
    let resp = app().oneshot(get("/404")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(content_type(&resp), "text/plain");
    assert_eq!(body_bytes(resp).await, "Not found");
}

#[tokio::test]
async fn root_is_html() {
    let resp = app().oneshot(get("/")).await.unwrap();
    assert_eq!(content_type(&resp), "text/html");
    assert_eq!(body_bytes(resp).await, INDEX_HTML);
}

#[tokio::test]
async fn query_params_are_echoed_in_order() {
    let resp = app()
        .oneshot(get("/queryParams?canisterId=rrkah-fqaaa-aaaaa-aaaaq-cai&foo=bar"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_bytes(resp).await;
    assert_eq!(body, r#"{"canisterId":"rrkah-fqaaa-aaaaa-aaaaq-cai","foo":"bar"}"#);
}

// --- cats ---

#[tokio::test]
async fn list_cats() {
    let resp = app().oneshot(get("/cats")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let cats: Vec<Cat> = body_json(resp).await;
    assert_eq!(cats.len(), 2);
    assert_eq!(cats[0].name, "Sardine");
}

#[tokio::test]
async fn get_cat_found_and_missing() {
    let resp = app().oneshot(get("/cats/Olive")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let cat: Cat = body_json(resp).await;
    assert_eq!(cat, Cat { name: "Olive".to_string(), age: 4 });

    let resp = app().oneshot(get("/cats/Whiskers")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_utf8_cat_name_is_bad_request() {
    let resp = app().oneshot(get("/cats/%FF")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

fn post_cat(body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri("/cats")
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

#[tokio::test]
async fn add_cat_then_list() {
    let state = AppState::default();

    let resp = app_with_state(state.clone())
        .oneshot(post_cat(r#"{"name":"Pepper","age":2}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(content_type(&resp), "application/json");
    assert_eq!(body_bytes(resp).await, r#"{"name":"Pepper","age":2}"#);

    let resp = app_with_state(state).oneshot(get("/cats")).await.unwrap();
    let cats: Vec<Cat> = body_json(resp).await;
    assert_eq!(cats.len(), 3);
    assert_eq!(cats[2], Cat { name: "Pepper".to_string(), age: 2 });
}

#[tokio::test]
async fn malformed_cat_is_plain_text_400() {
    let resp = app().oneshot(post_cat("{\"name\":")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(content_type(&resp), "text/plain");
    assert_eq!(body_bytes(resp).await, "Invalid cat body");
}

// --- greet ---

#[tokio::test]
async fn greet_posts_name() {
    let req = Request::builder()
        .method("POST")
        .uri("/greet?name=Ada")
        .body(String::new())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, "Hello, Ada!");
}

#[tokio::test]
async fn greet_with_get_is_express_style_404() {
    let resp = app().oneshot(get("/greet?name=Ada")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_bytes(resp).await, "Cannot GET /greet");
}

// --- fallback ---

#[tokio::test]
async fn unknown_path_is_plain_text_404() {
    let resp = app().oneshot(get("/nope")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(content_type(&resp), "text/plain");
}

// --- assets lifecycle ---

#[tokio::test]
async fn asset_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();
    let png = vec![0x89u8, b'P', b'N', b'G', 0, 255];

    // missing
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .uri("/assets/logo.png")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // store
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("POST")
                .uri("/assets/logo.png")
                .body(axum::body::Body::from(png.clone()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(body_bytes(resp).await, "logo.png");

    // fetch
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .uri("/assets/logo.png")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(content_type(&resp), "application/octet-stream");
    assert_eq!(body_bytes(resp).await.to_vec(), png);
}
