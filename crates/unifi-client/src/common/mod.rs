//! Common plumbing for the UniFi API client
//!
//! Request/response descriptors, the [`Transport`] seam the session executor
//! talks to, and the reqwest-backed [`HttpTransport`].

pub mod query;

use crate::config::ClientConfig;
use crate::error::UniFiError;
use reqwest::Method;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use std::sync::{PoisonError, RwLock};
use tracing::debug;
use uuid::Uuid;

/// Header carrying the API key on every request
pub const API_KEY_HEADER: &str = "X-API-Key";

/// One endpoint call: method, versioned-relative path, query pairs and body
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Build a request with no query or body
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into().trim_start_matches('/').to_string(),
            query: Vec::new(),
            body: None,
        }
    }

    /// GET `path`
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// POST `path` with a JSON body
    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    /// Append one query parameter
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append every query pair
    #[must_use]
    pub fn with_query_pairs(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Attach a JSON body
    #[must_use]
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// HTTP method
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path relative to the versioned API root, without leading slash
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameters in insertion order
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Look up a query parameter by name
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// JSON body, if any
    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }
}

/// Raw response handed back by a [`Transport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response payload as text
    pub body: String,
}

impl ApiResponse {
    /// Build a response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 401 or 403
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.status, 401 | 403)
    }
}

/// Wire-level operations the session executor depends on
///
/// Implementations must be shareable across threads; the executor calls
/// `send` concurrently and never holds its session lock while doing so.
pub trait Transport: Send + Sync {
    /// Establish a new session and return its token
    fn authenticate(&self) -> Result<String, UniFiError>;

    /// Perform one HTTP exchange under `token`
    ///
    /// Non-2xx statuses are returned as responses, not errors; only
    /// connectivity failures surface as `Err`.
    fn send(&self, request: &ApiRequest, token: &str) -> Result<ApiResponse, UniFiError>;

    /// Release pooled resources. Must be idempotent.
    fn close(&self) {}
}

struct Pool {
    token: String,
    client: Client,
}

/// Blocking reqwest transport for the Site Manager API
///
/// Site Manager authenticates each request by API key, so a session is a
/// pooled client with the key baked into its default headers. The session
/// token names that pool; refreshing replaces it with a fresh one.
pub struct HttpTransport {
    config: ClientConfig,
    pool: RwLock<Option<Pool>>,
}

impl HttpTransport {
    /// Create a transport; no connection is made until [`Transport::authenticate`]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            pool: RwLock::new(None),
        }
    }

    /// Settings the transport was built with
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a full URL from a relative path
    pub fn build_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_root(), path.trim_start_matches('/'))
    }

    fn build_client(&self) -> Result<Client, UniFiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut key = HeaderValue::from_str(self.config.api_key())
            .map_err(|e| UniFiError::validation(format!("API key is not a valid header value: {e}")))?;
        key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key);
        let agent = HeaderValue::from_str(self.config.user_agent())
            .map_err(|e| UniFiError::validation(format!("Invalid user agent: {e}")))?;
        headers.insert(USER_AGENT, agent);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(self.config.timeout())
            .pool_max_idle_per_host(20)
            .build()?;
        Ok(client)
    }

    /// Client for `token`, reopening the pool if it was closed underneath us
    fn client_for(&self, token: &str) -> Result<Client, UniFiError> {
        {
            let pool = self.pool.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(pool) = pool.as_ref() {
                if pool.token != token {
                    // A concurrent refresh replaced the pool; the newer one serves the same key.
                    debug!("Session {} superseded by {}", token, pool.token);
                }
                return Ok(pool.client.clone());
            }
        }

        let client = self.build_client()?;
        let mut pool = self.pool.write().unwrap_or_else(PoisonError::into_inner);
        let pool = pool.get_or_insert_with(|| Pool {
            token: token.to_string(),
            client,
        });
        Ok(pool.client.clone())
    }
}

impl Transport for HttpTransport {
    fn authenticate(&self) -> Result<String, UniFiError> {
        let client = self.build_client()?;
        let token = Uuid::new_v4().to_string();
        let previous = self
            .pool
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(Pool {
                token: token.clone(),
                client,
            });
        if let Some(previous) = previous {
            debug!("Dropping connection pool for session {}", previous.token);
        }
        Ok(token)
    }

    fn send(&self, request: &ApiRequest, token: &str) -> Result<ApiResponse, UniFiError> {
        let client = self.client_for(token)?;
        let url = self.build_url(request.path());
        debug!("{} {}", request.method(), url);

        let mut builder = client.request(request.method().clone(), &url);
        if !request.query().is_empty() {
            builder = builder.query(request.query());
        }
        if let Some(body) = request.body() {
            debug!(
                "{} {} with body: {}",
                request.method(),
                url,
                serde_json::to_string(body).unwrap_or_default()
            );
            builder = builder.json(body);
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(ApiResponse { status, body })
    }

    fn close(&self) {
        if let Some(pool) = self.pool.write().unwrap_or_else(PoisonError::into_inner).take() {
            debug!("Closed connection pool for session {}", pool.token);
        }
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let open = self
            .pool
            .read()
            .map(|p| p.is_some())
            .unwrap_or_else(|e| e.into_inner().is_some());
        f.debug_struct("HttpTransport")
            .field("config", &self.config)
            .field("open", &open)
            .finish()
    }
}
