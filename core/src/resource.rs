//! Resource handles: chainable locators for remote entities.
//!
//! A `Resource` is a client reference plus an ordered list of path segments.
//! It never holds fetched data. Every chaining method returns a new handle, so
//! a handle's path is fixed once it exists. The verb shorthands only fill in
//! the path and delegate to `Client::request`.
//!
//! ```ignore
//! let account = client.customer("cust_1").sub("bank_accounts").id("acct_9");
//! account.post_to("micro_verifications", &json!({"amount_1": 0.12}))?;
//! ```

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::auth::AuthScheme;
use crate::client::Client;
use crate::error::ApiError;
use crate::http::{HttpMethod, Response};
use crate::transport::Transport;

pub struct Resource<'c, T> {
    client: &'c Client<T>,
    segments: Vec<String>,
    scheme: AuthScheme,
}

impl<'c, T: Transport> Resource<'c, T> {
    pub(crate) fn new(client: &'c Client<T>, segments: Vec<String>) -> Self {
        Self {
            client,
            segments,
            scheme: client.scheme(),
        }
    }

    /// Child handle one segment deeper (a sub-collection or an action).
    pub fn sub(&self, name: impl fmt::Display) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self {
            client: self.client,
            segments,
            scheme: self.scheme,
        }
    }

    /// Child handle for one member of this collection.
    pub fn id(&self, id: impl fmt::Display) -> Self {
        self.sub(id)
    }

    /// Same path, authenticated with `scheme` instead of the client default.
    pub fn with_auth(&self, scheme: AuthScheme) -> Self {
        Self {
            client: self.client,
            segments: self.segments.clone(),
            scheme,
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn scheme(&self) -> AuthScheme {
        self.scheme
    }

    /// Absolute URL of this handle. No I/O.
    pub fn url(&self) -> Result<Url, ApiError> {
        self.client.url_for(&self.segments, &[])
    }

    /// Issue `method` against this handle's path.
    pub fn request(
        &self,
        method: HttpMethod,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Response, ApiError> {
        let url = self.client.url_for(&self.segments, query)?;
        self.client.request(method, url, self.scheme, body)
    }

    pub fn get(&self) -> Result<Response, ApiError> {
        self.request(HttpMethod::Get, &[], None)
    }

    /// GET with query filters, for collections.
    pub fn list(&self, query: &[(&str, &str)]) -> Result<Response, ApiError> {
        self.request(HttpMethod::Get, query, None)
    }

    /// POST `body` to this handle.
    pub fn create<B: Serialize + ?Sized>(&self, body: &B) -> Result<Response, ApiError> {
        self.with_body(HttpMethod::Post, body)
    }

    /// PATCH `body` onto this handle.
    pub fn update<B: Serialize + ?Sized>(&self, body: &B) -> Result<Response, ApiError> {
        self.with_body(HttpMethod::Patch, body)
    }

    pub fn delete(&self) -> Result<Response, ApiError> {
        self.request(HttpMethod::Delete, &[], None)
    }

    /// POST `body` to the `action` child of this handle.
    pub fn post_to<B: Serialize + ?Sized>(&self, action: impl fmt::Display, body: &B) -> Result<Response, ApiError> {
        self.sub(action).create(body)
    }

    fn with_body<B: Serialize + ?Sized>(&self, method: HttpMethod, body: &B) -> Result<Response, ApiError> {
        // Authorization must fail before serialization does.
        if self.scheme == AuthScheme::Bearer && !self.client.has_bearer_token() {
            return Err(ApiError::AuthenticationRequired);
        }
        let body = serde_json::to_value(body).map_err(ApiError::Serialization)?;
        self.request(method, &[], Some(&body))
    }
}

impl<T> Clone for Resource<'_, T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client,
            segments: self.segments.clone(),
            scheme: self.scheme,
        }
    }
}

impl<T> fmt::Debug for Resource<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("segments", &self.segments)
            .field("scheme", &self.scheme)
            .finish()
    }
}
