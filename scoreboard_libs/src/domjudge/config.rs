use std::{env, fmt};
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid contest API base url `{url}`")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("contest API base url `{0}` can not have path segments")]
    UnsupportedBaseUrl(String),
}

/// Basic authentication credentials forwarded to the contest API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

/// Where the contest API lives and how to authenticate against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: Url,
    pub credentials: Option<Credentials>,
}

impl ApiConfig {
    pub fn new(base_url: &str, credentials: Option<Credentials>) -> Result<Self, ConfigError> {
        let parsed = Url::parse(base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: String::from(base_url),
            source,
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ConfigError::UnsupportedBaseUrl(String::from(base_url)));
        }

        Ok(Self {
            base_url: parsed,
            credentials,
        })
    }

    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// The base url is taken from `VITE_API_BASE_URL` (or its alias `API_BASE_URL`), then
    /// `PUBLIC_API_BASE_URL`, then [`DEFAULT_API_BASE_URL`]. Credentials are enabled only when both `DOMJUDGE_USERNAME` and
    /// `DOMJUDGE_PASSWORD` are non-empty.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let base_url = non_empty("VITE_API_BASE_URL")
            .or_else(|| non_empty("API_BASE_URL"))
            .or_else(|| non_empty("PUBLIC_API_BASE_URL"))
            .unwrap_or_else(|| {
                tracing::warn!(
                    "VITE_API_BASE_URL environment variable is not set. Default value `{}` will be used.",
                    DEFAULT_API_BASE_URL
                );
                String::from(DEFAULT_API_BASE_URL)
            });

        let credentials = match (
            non_empty("DOMJUDGE_USERNAME"),
            non_empty("DOMJUDGE_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            _ => None,
        };

        Self::new(&base_url, credentials)
    }
}
