//! Client configuration.
//!
//! A `ClientConfig` can be built in code or read from the environment:
//!
//! | variable             | meaning                              | default |
//! |----------------------|--------------------------------------|---------|
//! | `REST_BASE_URL`      | base endpoint (production, staging)  | required |
//! | `REST_CLIENT_SECRET` | client secret                        | required |
//! | `REST_AUTH_SCHEME`   | `basic`, `bearer` or `token`         | `basic` |
//! | `REST_TIMEOUT_SECS`  | whole-call timeout in seconds        | `30`    |

use std::time::Duration;

use crate::auth::{AuthScheme, Credential};
use crate::error::ApiError;

/// Default whole-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_USER_AGENT: &str = concat!("rest-core/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub secret: Credential,
    /// Scheme used by calls that do not override it.
    pub scheme: AuthScheme,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            secret: Credential::new(secret),
            scheme: AuthScheme::default(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn scheme(mut self, scheme: AuthScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ApiError::Config(format!("{key} is not set")))
        };

        let mut config = Self::new(required("REST_BASE_URL")?, required("REST_CLIENT_SECRET")?);
        if let Some(scheme) = lookup("REST_AUTH_SCHEME") {
            config.scheme = scheme.parse()?;
        }
        if let Some(secs) = lookup("REST_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|e| ApiError::Config(format!("REST_TIMEOUT_SECS: {e}")))?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}
