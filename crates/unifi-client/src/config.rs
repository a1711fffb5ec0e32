//! Client configuration
//!
//! Settings are fixed when the client is built. They can be assembled in code
//! with the `with_*` builders or read from `UNIFI_*` environment variables.

use crate::error::UniFiError;
use std::time::Duration;

/// Default Site Manager host
pub const DEFAULT_BASE_URL: &str = "https://api.ui.com";
/// Default API version path segment
pub const DEFAULT_API_VERSION: &str = "v1";
/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default session lifetime (55 minutes)
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(55 * 60);

/// Environment variable names read by [`ClientConfig::from_env`]
pub mod env {
    /// API key (required)
    pub const API_KEY: &str = "UNIFI_API_KEY";
    /// API version, e.g. `v1`
    pub const API_VERSION: &str = "UNIFI_API_VERSION";
    /// Base URL without the version segment
    pub const BASE_URL: &str = "UNIFI_BASE_URL";
    /// Request timeout in seconds
    pub const TIMEOUT_SECS: &str = "UNIFI_TIMEOUT_SECS";
    /// Session lifetime in minutes
    pub const SESSION_TTL_MINUTES: &str = "UNIFI_SESSION_TTL_MINUTES";
}

/// Immutable client settings
#[derive(Clone)]
pub struct ClientConfig {
    api_key: String,
    api_version: String,
    base_url: String,
    timeout: Duration,
    session_ttl: Duration,
    user_agent: String,
}

impl ClientConfig {
    /// Create a configuration with default settings
    ///
    /// # Errors
    /// Returns [`UniFiError::Validation`] if `api_key` is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self, UniFiError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(UniFiError::validation("API key cannot be empty"));
        }

        Ok(Self {
            api_key,
            api_version: DEFAULT_API_VERSION.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            session_ttl: DEFAULT_SESSION_TTL,
            user_agent: format!("unifi-client/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Load configuration from the process environment
    ///
    /// # Errors
    /// Returns [`UniFiError::Validation`] if the API key is missing or a
    /// numeric variable does not parse.
    pub fn from_env() -> Result<Self, UniFiError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    /// See [`ClientConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, UniFiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(env::API_KEY).ok_or_else(|| {
            UniFiError::validation(format!("{} environment variable is required", env::API_KEY))
        })?;
        let mut config = Self::new(api_key)?;

        if let Some(version) = lookup(env::API_VERSION) {
            config = config.with_api_version(version)?;
        }
        if let Some(base_url) = lookup(env::BASE_URL) {
            config = config.with_base_url(base_url)?;
        }
        if let Some(raw) = lookup(env::TIMEOUT_SECS) {
            let secs = parse_number(env::TIMEOUT_SECS, &raw)?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(raw) = lookup(env::SESSION_TTL_MINUTES) {
            let minutes = parse_number(env::SESSION_TTL_MINUTES, &raw)?;
            config = config.with_session_ttl(Duration::from_secs(minutes.saturating_mul(60)));
        }

        Ok(config)
    }

    /// Use a different API version segment
    ///
    /// # Errors
    /// Returns [`UniFiError::Validation`] if `version` is empty or contains `/`.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Result<Self, UniFiError> {
        let version = version.into();
        if version.is_empty() || version.contains('/') {
            return Err(UniFiError::validation(format!("Invalid API version: {version:?}")));
        }
        self.api_version = version;
        Ok(self)
    }

    /// Point the client at another host (self-hosted proxies, tests)
    ///
    /// # Errors
    /// Returns [`UniFiError::Validation`] unless the URL is http(s).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Result<Self, UniFiError> {
        let base_url = base_url.into();
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(UniFiError::validation(format!(
                "Base URL must start with http:// or https://: {base_url}"
            )));
        }
        self.base_url = base_url.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Set the per-request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set how long a session is reused before it is refreshed
    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Override the `User-Agent` header
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// API key sent in the `X-API-Key` header
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// API version segment
    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Host URL without the version segment
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Versioned API root, e.g. `https://api.ui.com/v1`
    #[must_use]
    pub fn api_root(&self) -> String {
        format!("{}/{}", self.base_url, self.api_version)
    }

    /// Per-request timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Session lifetime
    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// `User-Agent` header value
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

// The API key stays out of logs.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("api_version", &self.api_version)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("session_ttl", &self.session_ttl)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

fn parse_number(name: &str, raw: &str) -> Result<u64, UniFiError> {
    raw.trim()
        .parse()
        .map_err(|e| UniFiError::validation(format!("{name} must be a non-negative integer: {e}")))
}
