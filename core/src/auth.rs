//! Authenticator: turns the stored credential into request headers.
//!
//! Three schemes are supported:
//! - `Basic`: the client secret as the basic-auth username, empty password.
//! - `Bearer`: a previously issued session token, `Authorization: Bearer <token>`.
//! - `Token`: the secret embedded as `Authorization: Token token=<secret>`.
//!
//! Everything here is a pure function of credential state.

use std::fmt;
use std::str::FromStr;

use base64::Engine;

use crate::error::ApiError;

/// An opaque secret. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Raw secret, for header construction only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Which header scheme a call is authenticated with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AuthScheme {
    #[default]
    Basic,
    Bearer,
    Token,
}

impl FromStr for AuthScheme {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(AuthScheme::Basic),
            "bearer" => Ok(AuthScheme::Bearer),
            "token" => Ok(AuthScheme::Token),
            other => Err(ApiError::Config(format!("unknown auth scheme: {other}"))),
        }
    }
}

/// The credential form produced for one call.
#[derive(Clone, PartialEq, Eq)]
pub enum Authorization {
    Basic { username: String, password: String },
    Bearer(String),
    Token(String),
}

impl Authorization {
    /// Value of the `Authorization` header.
    pub fn header_value(&self) -> String {
        match self {
            Authorization::Basic { username, password } => {
                let encoded = base64::engine::general_purpose::STANDARD
                    .encode(format!("{username}:{password}"));
                format!("Basic {encoded}")
            }
            Authorization::Bearer(token) => format!("Bearer {token}"),
            Authorization::Token(secret) => format!("Token token={secret}"),
        }
    }

    /// Header pair to attach to the request.
    pub fn header(&self) -> (String, String) {
        ("Authorization".to_string(), self.header_value())
    }
}

impl fmt::Debug for Authorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = match self {
            Authorization::Basic { .. } => "Basic",
            Authorization::Bearer(_) => "Bearer",
            Authorization::Token(_) => "Token",
        };
        write!(f, "Authorization::{scheme}(***)")
    }
}

/// Produce the authorization for `scheme`.
///
/// Fails with `AuthenticationRequired` when `scheme` is `Bearer` and no token
/// has been set.
pub fn authorize(
    scheme: AuthScheme,
    secret: &Credential,
    bearer: Option<&Credential>,
) -> Result<Authorization, ApiError> {
    match scheme {
        AuthScheme::Basic => Ok(Authorization::Basic {
            username: secret.expose().to_string(),
            password: String::new(),
        }),
        AuthScheme::Bearer => bearer
            .map(|token| Authorization::Bearer(token.expose().to_string()))
            .ok_or(ApiError::AuthenticationRequired),
        AuthScheme::Token => Ok(Authorization::Token(secret.expose().to_string())),
    }
}
