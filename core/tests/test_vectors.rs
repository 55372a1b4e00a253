//! Drive the router with the JSON cases in `test-vectors/routes.json`.
//!
//! Each case runs against a fresh router, so cases never see each other's
//! asset writes. `json` expectations compare parsed values (key order
//! ignored); `body` expectations compare exact text.

use compat_core::{HttpMethod, HttpRequest, Router, ServerContext};

#[test]
fn route_test_vectors() {
    let raw = include_str!("../../test-vectors/routes.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let req = &case["request"];
        let expected = &case["expected"];

        let method: HttpMethod = req["method"].as_str().unwrap().parse().unwrap();
        let body = req["body"].as_str().unwrap_or_default().as_bytes().to_vec();
        let request = HttpRequest::from_target(method, req["target"].as_str().unwrap(), Vec::new(), body);

        let router = Router::new(ServerContext::with_sample_cats());
        let response = router.route(&request);

        assert_eq!(
            u64::from(response.status),
            expected["status"].as_u64().unwrap(),
            "{name}: status"
        );
        assert_eq!(
            response.content_type(),
            expected["content_type"].as_str(),
            "{name}: content type"
        );
        if let Some(text) = expected["body"].as_str() {
            assert_eq!(response.body_text(), text, "{name}: body");
        }
        if let Some(json) = expected.get("json") {
            let actual: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
            assert_eq!(&actual, json, "{name}: json body");
        }
    }
}

#[test]
fn every_vector_has_a_unique_name() {
    let raw = include_str!("../../test-vectors/routes.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();
    let mut names: Vec<&str> = vectors["cases"]
        .as_array()
        .unwrap()
        .iter()
        .map(|case| case["name"].as_str().unwrap())
        .collect();
    let total = names.len();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), total);
}
