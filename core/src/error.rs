//! Error types for the resource client.
//!
//! # Design
//! Remote status codes are not mapped to variants here: any well-formed JSON
//! response is returned as data, and callers opt into status interpretation
//! with `Response::error_for_status`, which produces `Status`. Everything else
//! is a local failure (missing token, transport, undecodable body, bad
//! configuration) surfaced to the direct caller.

use thiserror::Error;

/// Boxed transport error, propagated unchanged from the HTTP backend.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by client, resource and transport operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A bearer-gated call was made before a bearer token was set.
    /// Raised before any network I/O.
    #[error("authentication required: no bearer token has been set")]
    AuthenticationRequired,

    /// DNS, connect, timeout or I/O failure while talking to the remote service.
    #[error("transport failure for {url}: {source}")]
    TransportFailure {
        url: String,
        #[source]
        source: BoxError,
    },

    /// The response body was not valid JSON. `body` holds the raw text
    /// (lossily converted if it was not UTF-8).
    #[error("could not decode response (HTTP {status}, content-type {content_type:?}) as JSON: {source}")]
    DecodeFailure {
        status: u16,
        content_type: Option<String>,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// A path segment of `.` or `..`, which URL normalization would collapse.
    #[error("path segment {0:?} is not allowed")]
    InvalidSegment(String),

    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),

    #[error("endpoint {endpoint:?} is missing argument {name:?}")]
    MissingTemplateArgument { endpoint: String, name: String },

    /// Produced only by `Response::error_for_status`.
    #[error("HTTP {status}: {body}")]
    Status {
        status: u16,
        body: serde_json::Value,
    },

    #[error("configuration error: {0}")]
    Config(String),
}
