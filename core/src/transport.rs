//! Transport Invoker: one synchronous HTTP round trip plus JSON decoding.
//!
//! # Design
//! `Transport` is the seam to the network. `UreqTransport` is the production
//! implementation; tests substitute their own. The invoker never inspects the
//! status code: any response whose body decodes as JSON is returned, and a
//! body that does not decode fails with `DecodeFailure` carrying the raw text.
//! Nothing is retried.

use std::time::Duration;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Response};

/// Executes an `HttpRequest` against the network.
pub trait Transport {
    /// Perform the round trip. Non-2xx statuses are returned as data; only
    /// transport-level failures are errors.
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).send(request)
    }
}

/// `Transport` backed by a blocking `ureq::Agent`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Build an agent that returns 4xx/5xx responses as data and applies
    /// `timeout` to the whole call.
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let failure = |e: ureq::Error| ApiError::TransportFailure {
            url: request.url.clone(),
            source: Box::new(e),
        };

        let url = request.url.as_str();
        let body = request.body.as_deref();
        if body.is_some() && !request.method.has_body() {
            tracing::warn!(method = %request.method, "dropping body on request that does not carry one");
        }

        let result = match request.method {
            HttpMethod::Get => with_headers(self.agent.get(url), request).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(url), request).call(),
            HttpMethod::Post => {
                let builder = with_headers(self.agent.post(url), request);
                match body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
            HttpMethod::Patch => {
                let builder = with_headers(self.agent.patch(url), request);
                match body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(failure)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_vec().map_err(failure)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, request: &HttpRequest) -> ureq::RequestBuilder<B> {
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// Decode a raw response. Anything that is not a JSON document, including an
/// empty body, is a `DecodeFailure`.
pub fn decode(response: HttpResponse) -> Result<Response, ApiError> {
    match serde_json::from_slice(&response.body) {
        Ok(body) => Ok(Response {
            status: response.status,
            body,
        }),
        Err(source) => Err(ApiError::DecodeFailure {
            status: response.status,
            content_type: response.header("content-type").map(str::to_string),
            body: String::from_utf8_lossy(&response.body).into_owned(),
            source,
        }),
    }
}

/// Send `request` through `transport` and decode the result.
pub fn invoke<T: Transport + ?Sized>(transport: &T, request: &HttpRequest) -> Result<Response, ApiError> {
    let response = transport.send(request)?;
    decode(response)
}
