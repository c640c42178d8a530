//! Client configuration.
//!
//! # Responsibility
//! - Resolve the REST API base URL (the only environment-driven setting).
//! - Carry transport settings shared by the HTTP store and event channel.
//!
//! # Invariants
//! - `api_base_url` is an absolute `http`/`https` URL without trailing `/`.

use reqwest::Url;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "GYMDESK_API_URL";
/// Base URL used when the environment does not provide one.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
/// Request timeout used unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

const API_PATH_SUFFIX: &str = "/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidBaseUrl { value: String, reason: String },
    UnsupportedScheme(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBaseUrl { value, reason } => {
                write!(f, "invalid API base url `{value}`: {reason}")
            }
            Self::UnsupportedScheme(scheme) => {
                write!(f, "unsupported API url scheme `{scheme}`; expected http|https")
            }
        }
    }
}

impl Error for ConfigError {}

/// Settings for talking to the gym REST API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_base_url: String,
    timeout: Duration,
    bearer_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            bearer_token: None,
        }
    }
}

impl ClientConfig {
    /// Builds a config for an explicit base URL.
    ///
    /// # Errors
    /// - `InvalidBaseUrl` when the value does not parse as an absolute URL.
    /// - `UnsupportedScheme` for anything but `http`/`https`.
    pub fn new(api_base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: normalize_base_url(api_base_url)?,
            ..Self::default()
        })
    }

    /// Reads `GYMDESK_API_URL`, falling back to the default base URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env` with an injectable variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        match lookup(API_URL_ENV).filter(|value| !value.trim().is_empty()) {
            Some(value) => Self::new(&value),
            None => Ok(Self::default()),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Attaches the session token obtained at login.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.bearer_token = Some(token).filter(|value| !value.trim().is_empty());
        self
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_str()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }

    /// Absolute URL for an API path such as `/employees`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }

    /// Event channel origin: the base URL without its `/api` suffix.
    pub fn socket_url(&self) -> &str {
        self.api_base_url
            .strip_suffix(API_PATH_SUFFIX)
            .unwrap_or(self.api_base_url.as_str())
    }
}

fn normalize_base_url(value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|err| ConfigError::InvalidBaseUrl {
        value: trimmed.to_string(),
        reason: err.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}
