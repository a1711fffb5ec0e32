//! UniFiApi trait for mocking
//!
//! [`UniFiClient`](crate::UniFiClient) implements this trait; code that
//! consumes the API can take `&dyn UniFiApi` and be tested against
//! `MockUniFiClient` instead of a live Site Manager.

use crate::common::query::{DeviceQuery, IspMetricsQuery, IspMetricsRange, MetricType};
use crate::error::UniFiError;
use crate::models::*;

/// Site Manager endpoint operations
pub trait UniFiApi: Send + Sync {
    // Hosts
    fn list_hosts(&self, page_size: u32, next_token: Option<&str>) -> Result<ApiResponseEnvelope<Vec<Host>>, UniFiError>;
    fn get_host_by_id(&self, host_id: &str) -> Result<ApiResponseEnvelope<Host>, UniFiError>;

    // Sites and devices
    fn list_sites(&self, page_size: u32, next_token: Option<&str>) -> Result<ApiResponseEnvelope<Vec<Site>>, UniFiError>;
    fn list_devices(&self, filter: &DeviceQuery) -> Result<ApiResponseEnvelope<Vec<HostDevices>>, UniFiError>;

    // ISP metrics
    fn get_isp_metrics(&self, metric_type: MetricType, range: &IspMetricsRange) -> Result<ApiResponseEnvelope<Vec<IspMetrics>>, UniFiError>;
    fn query_isp_metrics(&self, metric_type: MetricType, filter: &IspMetricsQuery) -> Result<ApiResponseEnvelope<IspMetricsQueryResult>, UniFiError>;

    // SD-WAN
    fn list_sd_wan_configs(&self) -> Result<ApiResponseEnvelope<Vec<SdWanConfig>>, UniFiError>;
    fn get_sd_wan_config_by_id(&self, config_id: &str) -> Result<ApiResponseEnvelope<SdWanConfig>, UniFiError>;
    fn get_sd_wan_config_status(&self, config_id: &str) -> Result<ApiResponseEnvelope<SdWanConfigStatus>, UniFiError>;
}
