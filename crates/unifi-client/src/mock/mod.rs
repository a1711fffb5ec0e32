//! Mock UniFiClient for unit testing
//!
//! [`MockUniFiClient`] implements [`UniFiApi`] over in-memory stores. It
//! applies the same argument validation as the real client, pages list
//! results with opaque `nextToken` cursors, answers 404 for unknown ids, and
//! can be primed with failures to exercise error paths.

pub mod helpers;

use crate::common::query::{self, DeviceQuery, IspMetricsQuery, IspMetricsRange, MetricType};
use crate::error::UniFiError;
use crate::models::*;
use crate::unifi_trait::UniFiApi;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const CURSOR_PREFIX: &str = "mock-cursor-";

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock UniFiClient for testing
///
/// Clones share the same stores, so a test can keep a handle for setup
/// while the code under test owns another.
#[derive(Clone, Default)]
pub struct MockUniFiClient {
    hosts: Arc<Mutex<Vec<Host>>>,
    sites: Arc<Mutex<Vec<Site>>>,
    devices: Arc<Mutex<Vec<HostDevices>>>,
    isp_metrics: Arc<Mutex<HashMap<MetricType, Vec<IspMetrics>>>>,
    sd_wan_configs: Arc<Mutex<Vec<SdWanConfig>>>,
    sd_wan_statuses: Arc<Mutex<HashMap<String, SdWanConfigStatus>>>,
    failures: Arc<Mutex<VecDeque<UniFiError>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockUniFiClient {
    /// Create an empty mock
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a host to the mock store (for test setup)
    pub fn add_host(&self, host: Host) {
        lock(&self.hosts).push(host);
    }

    /// Add a site to the mock store
    pub fn add_site(&self, site: Site) {
        lock(&self.sites).push(site);
    }

    /// Add a device under `host_id`, creating the host group if needed
    pub fn add_device(&self, host_id: &str, device: Device) {
        let mut groups = lock(&self.devices);
        if let Some(group) = groups.iter_mut().find(|g| g.host_id == host_id) {
            group.devices.push(device);
        } else {
            groups.push(helpers::host_devices(host_id, vec![device]));
        }
    }

    /// Add ISP metrics served for `metric_type`
    pub fn add_isp_metrics(&self, metric_type: MetricType, metrics: IspMetrics) {
        lock(&self.isp_metrics).entry(metric_type).or_default().push(metrics);
    }

    /// Add an SD-WAN configuration and optionally its status
    pub fn add_sd_wan_config(&self, config: SdWanConfig, status: Option<SdWanConfigStatus>) {
        if let Some(status) = status {
            lock(&self.sd_wan_statuses).insert(config.id.clone(), status);
        }
        lock(&self.sd_wan_configs).push(config);
    }

    /// Make the next call fail with `error` (queued, one per call)
    pub fn fail_next(&self, error: UniFiError) {
        lock(&self.failures).push_back(error);
    }

    /// Names of the operations called so far, in order
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    fn record(&self, operation: &str) -> Result<(), UniFiError> {
        lock(&self.calls).push(operation.to_string());
        match lock(&self.failures).pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn not_found(kind: &str, id: &str) -> UniFiError {
        UniFiError::Api {
            status: 404,
            body: format!(r#"{{"code":"NOT_FOUND","message":"{kind} {id} not found"}}"#),
        }
    }

    fn page<T: Clone>(items: &[T], page_size: usize, next_token: Option<&str>) -> Result<ApiResponseEnvelope<Vec<T>>, UniFiError> {
        let offset = match next_token.filter(|t| !t.is_empty()) {
            None => 0,
            Some(token) => token
                .strip_prefix(CURSOR_PREFIX)
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| UniFiError::Api {
                    status: 400,
                    body: format!("invalid nextToken: {token}"),
                })?,
        };

        let end = offset.saturating_add(page_size).min(items.len());
        let data = items.get(offset..end).map(<[T]>::to_vec).unwrap_or_default();
        let mut envelope = ApiResponseEnvelope::new(data);
        if end < items.len() {
            envelope.next_token = Some(format!("{CURSOR_PREFIX}{end}"));
        }
        Ok(envelope)
    }
}

impl std::fmt::Debug for MockUniFiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockUniFiClient")
            .field("hosts", &lock(&self.hosts).len())
            .field("sites", &lock(&self.sites).len())
            .field("sd_wan_configs", &lock(&self.sd_wan_configs).len())
            .finish_non_exhaustive()
    }
}

impl UniFiApi for MockUniFiClient {
    fn list_hosts(&self, page_size: u32, next_token: Option<&str>) -> Result<ApiResponseEnvelope<Vec<Host>>, UniFiError> {
        query::validate_page_size(page_size)?;
        self.record("list_hosts")?;
        Self::page(lock(&self.hosts).as_slice(), page_size as usize, next_token)
    }

    fn get_host_by_id(&self, host_id: &str) -> Result<ApiResponseEnvelope<Host>, UniFiError> {
        query::validate_id("host_id", host_id)?;
        self.record("get_host_by_id")?;
        lock(&self.hosts)
            .iter()
            .find(|h| h.id == host_id)
            .cloned()
            .map(ApiResponseEnvelope::new)
            .ok_or_else(|| Self::not_found("host", host_id))
    }

    fn list_sites(&self, page_size: u32, next_token: Option<&str>) -> Result<ApiResponseEnvelope<Vec<Site>>, UniFiError> {
        query::validate_page_size(page_size)?;
        self.record("list_sites")?;
        Self::page(lock(&self.sites).as_slice(), page_size as usize, next_token)
    }

    fn list_devices(&self, filter: &DeviceQuery) -> Result<ApiResponseEnvelope<Vec<HostDevices>>, UniFiError> {
        filter.to_params()?;
        self.record("list_devices")?;
        let groups: Vec<HostDevices> = lock(&self.devices)
            .iter()
            .filter(|g| filter.host_ids.is_empty() || filter.host_ids.contains(&g.host_id))
            .cloned()
            .collect();
        let page_size = filter.page_size.map_or(usize::MAX, |n| n as usize);
        Self::page(&groups, page_size, filter.next_token.as_deref())
    }

    fn get_isp_metrics(&self, metric_type: MetricType, range: &IspMetricsRange) -> Result<ApiResponseEnvelope<Vec<IspMetrics>>, UniFiError> {
        range.to_params(metric_type)?;
        self.record("get_isp_metrics")?;
        let metrics = lock(&self.isp_metrics).get(&metric_type).cloned().unwrap_or_default();
        Ok(ApiResponseEnvelope::new(metrics))
    }

    fn query_isp_metrics(&self, metric_type: MetricType, filter: &IspMetricsQuery) -> Result<ApiResponseEnvelope<IspMetricsQueryResult>, UniFiError> {
        filter.to_body()?;
        self.record("query_isp_metrics")?;
        let metrics = lock(&self.isp_metrics)
            .get(&metric_type)
            .map(|all| {
                all.iter()
                    .filter(|m| {
                        let site_match = m.site_id.as_ref().is_some_and(|id| filter.site_ids.contains(id));
                        let host_match = m.host_id.as_ref().is_some_and(|id| filter.host_ids.contains(id));
                        site_match || host_match
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(ApiResponseEnvelope::new(IspMetricsQueryResult {
            metrics,
            extra: serde_json::Map::new(),
        }))
    }

    fn list_sd_wan_configs(&self) -> Result<ApiResponseEnvelope<Vec<SdWanConfig>>, UniFiError> {
        self.record("list_sd_wan_configs")?;
        Ok(ApiResponseEnvelope::new(lock(&self.sd_wan_configs).clone()))
    }

    fn get_sd_wan_config_by_id(&self, config_id: &str) -> Result<ApiResponseEnvelope<SdWanConfig>, UniFiError> {
        query::validate_id("config_id", config_id)?;
        self.record("get_sd_wan_config_by_id")?;
        lock(&self.sd_wan_configs)
            .iter()
            .find(|c| c.id == config_id)
            .cloned()
            .map(ApiResponseEnvelope::new)
            .ok_or_else(|| Self::not_found("sd-wan config", config_id))
    }

    fn get_sd_wan_config_status(&self, config_id: &str) -> Result<ApiResponseEnvelope<SdWanConfigStatus>, UniFiError> {
        query::validate_id("config_id", config_id)?;
        self.record("get_sd_wan_config_status")?;
        lock(&self.sd_wan_statuses)
            .get(config_id)
            .cloned()
            .map(ApiResponseEnvelope::new)
            .ok_or_else(|| Self::not_found("sd-wan config", config_id))
    }
}
