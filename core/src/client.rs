//! The resource client.
//!
//! # Design
//! `Client` owns one credential and one base URL and holds no other mutable
//! state except the optional bearer token, which can only be set (or
//! overwritten) through `&mut self`. Every call goes through the same path:
//! resolve the URL, authorize, serialize the body (`build_request`, no I/O),
//! then send and decode (`execute`). Authorization runs first, so a
//! bearer-gated call without a token fails before anything else happens.

use std::fmt;

use serde_json::Value;
use tracing::{debug, warn, Span};
use url::Url;

use crate::auth::{authorize, AuthScheme, Credential};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, Response};
use crate::path::{self, EndpointTable};
use crate::resource::Resource;
use crate::transport::{self, Transport, UreqTransport};

const JSON: &str = "application/json";

pub struct Client<T = UreqTransport> {
    base_url: Url,
    secret: Credential,
    scheme: AuthScheme,
    user_agent: String,
    bearer_token: Option<Credential>,
    endpoints: EndpointTable,
    transport: T,
}

impl Client<UreqTransport> {
    /// Create a client that talks HTTP through ureq.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> Client<T> {
    /// Create a client on top of an arbitrary transport.
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self, ApiError> {
        if config.secret.is_empty() {
            return Err(ApiError::Config("client secret must not be empty".to_string()));
        }
        Ok(Self {
            base_url: path::parse_base(&config.base_url)?,
            secret: config.secret,
            scheme: config.scheme,
            user_agent: config.user_agent,
            bearer_token: None,
            endpoints: EndpointTable::new(),
            transport,
        })
    }

    /// Attach a named endpoint table for `endpoint_url` / `call_endpoint`.
    pub fn with_endpoints(mut self, endpoints: EndpointTable) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Set the session token used by `AuthScheme::Bearer` calls. Setting it
    /// again overwrites the previous token; there is no way to unset it.
    pub fn set_bearer_token(&mut self, token: impl Into<String>) {
        self.bearer_token = Some(Credential::new(token));
    }

    pub fn has_bearer_token(&self) -> bool {
        self.bearer_token.is_some()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Default scheme for calls that do not override it.
    pub fn scheme(&self) -> AuthScheme {
        self.scheme
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Handle for a top-level collection, e.g. `client.resource("customers")`.
    pub fn resource(&self, name: impl fmt::Display) -> Resource<'_, T> {
        Resource::new(self, vec![name.to_string()])
    }

    /// Shorthand for `resource("customers").id(id)`.
    pub fn customer(&self, id: impl fmt::Display) -> Resource<'_, T> {
        self.resource("customers").id(id)
    }

    /// Resolve `segments` and `query` against the base URL.
    pub fn url_for<S: AsRef<str>>(&self, segments: &[S], query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = path::resolve(&self.base_url, segments)?;
        path::append_query(&mut url, query);
        Ok(url)
    }

    /// Resolve a named endpoint from the attached table.
    pub fn endpoint_url(&self, name: &str, args: &[(&str, &str)]) -> Result<Url, ApiError> {
        self.endpoints.resolve(&self.base_url, name, args)
    }

    /// Build the request for one call without performing any I/O.
    ///
    /// A body is only attached for verbs that carry one.
    pub fn build_request(
        &self,
        method: HttpMethod,
        url: Url,
        scheme: AuthScheme,
        body: Option<&Value>,
    ) -> Result<HttpRequest, ApiError> {
        let auth = authorize(scheme, &self.secret, self.bearer_token.as_ref())?;

        let mut headers = vec![
            auth.header(),
            ("Accept".to_string(), JSON.to_string()),
            ("User-Agent".to_string(), self.user_agent.clone()),
        ];

        let body = match body {
            Some(value) if method.has_body() => {
                headers.push(("Content-Type".to_string(), JSON.to_string()));
                Some(serde_json::to_string(value).map_err(ApiError::Serialization)?)
            }
            Some(_) => {
                warn!(%method, "ignoring body for {method} request");
                None
            }
            None => None,
        };

        Ok(HttpRequest {
            method,
            url: url.into(),
            headers,
            body,
        })
    }

    /// Send a built request and decode the response.
    #[tracing::instrument(
        name = "api_request",
        skip(self, request),
        fields(
            http.method = %request.method,
            http.url = %request.url,
            http.status_code = tracing::field::Empty,
        )
    )]
    pub fn execute(&self, request: &HttpRequest) -> Result<Response, ApiError> {
        let result = transport::invoke(&self.transport, request);
        match &result {
            Ok(response) => {
                Span::current().record("http.status_code", response.status);
                debug!("request completed");
            }
            Err(ApiError::DecodeFailure { status, .. }) => {
                Span::current().record("http.status_code", *status);
                debug!("response body was not JSON");
            }
            Err(e) => debug!(error = %e, "request failed"),
        }
        result
    }

    /// Build and execute in one step.
    pub fn request(
        &self,
        method: HttpMethod,
        url: Url,
        scheme: AuthScheme,
        body: Option<&Value>,
    ) -> Result<Response, ApiError> {
        let request = self.build_request(method, url, scheme, body)?;
        self.execute(&request)
    }

    /// Call a named endpoint with the client's default scheme.
    pub fn call_endpoint(
        &self,
        method: HttpMethod,
        name: &str,
        args: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Response, ApiError> {
        let url = self.endpoint_url(name, args)?;
        self.request(method, url, self.scheme, body)
    }
}

impl<T> fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("scheme", &self.scheme)
            .field("has_bearer_token", &self.bearer_token.is_some())
            .finish_non_exhaustive()
    }
}
