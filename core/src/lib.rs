//! Synchronous client for JSON REST resources.
//!
//! # Overview
//! A `Client` is bound to one base URL and one client secret. Resource
//! handles chain path segments off it (`client.customer(id).sub("bank")`),
//! and each verb call resolves the URL, attaches the `Authorization` header
//! for the chosen scheme, serializes the body, performs one blocking round
//! trip and decodes the JSON response.
//!
//! # Design
//! - `path` joins segments with exactly one separator and escapes reserved
//!   characters; named endpoint templates are also supported.
//! - `auth` produces basic, bearer or token-scheme headers. A bearer call
//!   without a token fails with `AuthenticationRequired` before any I/O.
//! - `transport` is the only place that touches the network, behind the
//!   `Transport` trait. Status codes are returned as data; callers decide
//!   what a non-2xx response means (`Response::error_for_status`).
//! - `Client::build_request` and `Client::execute` keep request building
//!   separate from I/O so requests can be inspected or sent elsewhere.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod path;
pub mod resource;
pub mod transport;

pub use auth::{AuthScheme, Authorization, Credential};
pub use client::Client;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Response};
pub use path::EndpointTable;
pub use resource::Resource;
pub use transport::{Transport, UreqTransport};
