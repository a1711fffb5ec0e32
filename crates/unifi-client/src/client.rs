//! UniFi Site Manager API client
//!
//! Every endpoint goes through [`UniFiClient::execute`], which attaches a
//! live session token, refreshes it when it has expired, and retries exactly
//! once when the API answers 401 or 403.

use crate::common::query::{self, DeviceQuery, IspMetricsQuery, IspMetricsRange, MetricType};
use crate::common::{ApiRequest, ApiResponse, HttpTransport, Transport};
use crate::config::ClientConfig;
use crate::error::UniFiError;
use crate::models::*;
use crate::session::SessionHolder;
use crate::unifi_trait::UniFiApi;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

/// Site Manager client bound to one API key
///
/// Safe to share across threads (`&self` everywhere). Dropping the client
/// closes its transport.
pub struct UniFiClient<T: Transport = HttpTransport> {
    config: ClientConfig,
    transport: T,
    session: SessionHolder,
}

impl UniFiClient<HttpTransport> {
    /// Create a client with default settings
    ///
    /// # Arguments
    /// * `api_key` - Site Manager API key
    ///
    /// # Errors
    /// Returns [`UniFiError::Validation`] if `api_key` is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self, UniFiError> {
        Ok(Self::with_config(ClientConfig::new(api_key)?))
    }

    /// Create a client from explicit settings
    pub fn with_config(config: ClientConfig) -> Self {
        let transport = HttpTransport::new(config.clone());
        Self::with_transport(config, transport)
    }

    /// Create a client from `UNIFI_*` environment variables
    ///
    /// # Errors
    /// See [`ClientConfig::from_env`].
    pub fn from_env() -> Result<Self, UniFiError> {
        Ok(Self::with_config(ClientConfig::from_env()?))
    }
}

impl<T: Transport> UniFiClient<T> {
    /// Create a client over a custom transport
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        let session = SessionHolder::new(config.session_ttl());
        Self {
            config,
            transport,
            session,
        }
    }

    /// Client settings
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Whether a session is currently held
    pub fn has_session(&self) -> bool {
        self.session.is_present()
    }

    /// Token of a valid session, authenticating first if needed
    ///
    /// # Errors
    /// Propagates failures from the transport's authentication step.
    pub fn session_token(&self) -> Result<String, UniFiError> {
        self.session.token_or_refresh(|| self.transport.authenticate())
    }

    /// Discard the current session; the next call opens a new one
    pub fn refresh_session(&self) {
        self.session.clear();
        info!("Session manually refreshed");
    }

    /// Release the session and the transport. Safe to call repeatedly.
    ///
    /// A closed client re-opens on its next call.
    pub fn close(&self) {
        if self.session.clear().is_some() {
            debug!("Session closed");
        }
        self.transport.close();
    }

    /// Perform one API call with session refresh and a single auth retry
    ///
    /// # Errors
    /// * [`UniFiError::Api`] - non-2xx status (after the retry for 401/403)
    /// * [`UniFiError::Transport`] - connectivity or timeout failure
    /// * [`UniFiError::Decode`] - 2xx body is not the expected JSON
    pub fn execute<R: DeserializeOwned>(&self, request: &ApiRequest) -> Result<R, UniFiError> {
        let response = self.send_with_session(request)?;

        let response = if response.is_auth_failure() {
            warn!(
                "Authentication error ({}) on {} {}, attempting session refresh",
                response.status,
                request.method(),
                request.path()
            );
            self.session.clear();
            self.send_with_session(request)?
        } else {
            response
        };

        if !response.is_success() {
            debug!("HTTP error: {} - {}", response.status, response.body);
            return Err(UniFiError::Api {
                status: response.status,
                body: response.body,
            });
        }

        serde_json::from_str(&response.body).map_err(|e| {
            debug!(
                "Invalid JSON response (first 500 chars): {}",
                response.body.chars().take(500).collect::<String>()
            );
            UniFiError::Decode(e)
        })
    }

    fn send_with_session(&self, request: &ApiRequest) -> Result<ApiResponse, UniFiError> {
        let token = self.session_token()?;
        self.transport.send(request, &token)
    }

    /// List hosts with pagination support
    ///
    /// # Arguments
    /// * `page_size` - Number of results per page (1-100)
    /// * `next_token` - Cursor from a previous page
    pub fn list_hosts(
        &self,
        page_size: u32,
        next_token: Option<&str>,
    ) -> Result<ApiResponseEnvelope<Vec<Host>>, UniFiError> {
        let params = query::page_params(page_size, next_token)?;
        self.execute(&ApiRequest::get("hosts").with_query_pairs(params))
    }

    /// Get a host by ID
    pub fn get_host_by_id(&self, host_id: &str) -> Result<ApiResponseEnvelope<Host>, UniFiError> {
        query::validate_id("host_id", host_id)?;
        let path = format!("hosts/{}", query::path_segment(host_id));
        self.execute(&ApiRequest::get(path))
    }

    /// List sites with pagination support
    pub fn list_sites(
        &self,
        page_size: u32,
        next_token: Option<&str>,
    ) -> Result<ApiResponseEnvelope<Vec<Site>>, UniFiError> {
        let params = query::page_params(page_size, next_token)?;
        self.execute(&ApiRequest::get("sites").with_query_pairs(params))
    }

    /// List devices, grouped by managing host
    pub fn list_devices(
        &self,
        filter: &DeviceQuery,
    ) -> Result<ApiResponseEnvelope<Vec<HostDevices>>, UniFiError> {
        let params = filter.to_params()?;
        self.execute(&ApiRequest::get("devices").with_query_pairs(params))
    }

    /// Get ISP metrics for all sites over a window
    ///
    /// # Arguments
    /// * `metric_type` - Sample interval
    /// * `range` - Either a relative duration or explicit timestamps
    pub fn get_isp_metrics(
        &self,
        metric_type: MetricType,
        range: &IspMetricsRange,
    ) -> Result<ApiResponseEnvelope<Vec<IspMetrics>>, UniFiError> {
        let params = range.to_params(metric_type)?;
        let path = format!("ea/isp-metrics/{metric_type}");
        self.execute(&ApiRequest::get(path).with_query_pairs(params))
    }

    /// Query ISP metrics for specific sites and hosts
    pub fn query_isp_metrics(
        &self,
        metric_type: MetricType,
        filter: &IspMetricsQuery,
    ) -> Result<ApiResponseEnvelope<IspMetricsQueryResult>, UniFiError> {
        let body = filter.to_body()?;
        let path = format!("ea/isp-metrics/{metric_type}/query");
        self.execute(&ApiRequest::post(path, body))
    }

    /// List SD-WAN configurations
    pub fn list_sd_wan_configs(&self) -> Result<ApiResponseEnvelope<Vec<SdWanConfig>>, UniFiError> {
        self.execute(&ApiRequest::get("ea/sd-wan-configs"))
    }

    /// Get an SD-WAN configuration by ID
    pub fn get_sd_wan_config_by_id(
        &self,
        config_id: &str,
    ) -> Result<ApiResponseEnvelope<SdWanConfig>, UniFiError> {
        query::validate_id("config_id", config_id)?;
        let path = format!("ea/sd-wan-configs/{}", query::path_segment(config_id));
        self.execute(&ApiRequest::get(path))
    }

    /// Get deployment status of an SD-WAN configuration
    pub fn get_sd_wan_config_status(
        &self,
        config_id: &str,
    ) -> Result<ApiResponseEnvelope<SdWanConfigStatus>, UniFiError> {
        query::validate_id("config_id", config_id)?;
        let path = format!("ea/sd-wan-configs/{}/status", query::path_segment(config_id));
        self.execute(&ApiRequest::get(path))
    }
}

impl<T: Transport> Drop for UniFiClient<T> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<T: Transport> std::fmt::Debug for UniFiClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UniFiClient")
            .field("config", &self.config)
            .field("session", &self.session.is_present())
            .finish_non_exhaustive()
    }
}

impl<T: Transport> UniFiApi for UniFiClient<T> {
    fn list_hosts(&self, page_size: u32, next_token: Option<&str>) -> Result<ApiResponseEnvelope<Vec<Host>>, UniFiError> {
        self.list_hosts(page_size, next_token)
    }

    fn get_host_by_id(&self, host_id: &str) -> Result<ApiResponseEnvelope<Host>, UniFiError> {
        self.get_host_by_id(host_id)
    }

    fn list_sites(&self, page_size: u32, next_token: Option<&str>) -> Result<ApiResponseEnvelope<Vec<Site>>, UniFiError> {
        self.list_sites(page_size, next_token)
    }

    fn list_devices(&self, filter: &DeviceQuery) -> Result<ApiResponseEnvelope<Vec<HostDevices>>, UniFiError> {
        self.list_devices(filter)
    }

    fn get_isp_metrics(&self, metric_type: MetricType, range: &IspMetricsRange) -> Result<ApiResponseEnvelope<Vec<IspMetrics>>, UniFiError> {
        self.get_isp_metrics(metric_type, range)
    }

    fn query_isp_metrics(&self, metric_type: MetricType, filter: &IspMetricsQuery) -> Result<ApiResponseEnvelope<IspMetricsQueryResult>, UniFiError> {
        self.query_isp_metrics(metric_type, filter)
    }

    fn list_sd_wan_configs(&self) -> Result<ApiResponseEnvelope<Vec<SdWanConfig>>, UniFiError> {
        self.list_sd_wan_configs()
    }

    fn get_sd_wan_config_by_id(&self, config_id: &str) -> Result<ApiResponseEnvelope<SdWanConfig>, UniFiError> {
        self.get_sd_wan_config_by_id(config_id)
    }

    fn get_sd_wan_config_status(&self, config_id: &str) -> Result<ApiResponseEnvelope<SdWanConfigStatus>, UniFiError> {
        self.get_sd_wan_config_status(config_id)
    }
}
