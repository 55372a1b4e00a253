//! Executes core `HttpRequest`s over the network with ureq.
//!
//! 4xx/5xx answers come back as data, not errors, so status interpretation
//! stays with the core parsers. Only a failed round-trip (refused
//! connection, broken body) becomes `Error::UpstreamUnavailable`.

use compat_core::{Error, HttpMethod, HttpRequest, HttpResponse, Result};
use ureq::{Agent, RequestBuilder};

pub fn agent() -> Agent {
    Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent()
}

pub fn execute(agent: &Agent, url: &str, req: &HttpRequest) -> Result<HttpResponse> {
    let result = match req.method {
        HttpMethod::Get => with_headers(agent.get(url), &req.headers).call(),
        HttpMethod::Delete => with_headers(agent.delete(url), &req.headers).call(),
        HttpMethod::Post => with_headers(agent.post(url), &req.headers).send(req.body.as_slice()),
        HttpMethod::Put => with_headers(agent.put(url), &req.headers).send(req.body.as_slice()),
    };
    let mut response = result.map_err(unavailable)?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            let value = value.to_str().ok()?;
            Some((name.as_str().to_string(), value.to_string()))
        })
        .collect();
    // Assets have no size cap; lift ureq's default read limit.
    let body = response
        .body_mut()
        .with_config()
        .limit(u64::MAX)
        .read_to_vec()
        .map_err(unavailable)?;

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn unavailable(err: ureq::Error) -> Error {
    Error::UpstreamUnavailable(err.to_string())
}
