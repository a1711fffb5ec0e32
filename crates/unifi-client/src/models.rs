//! UniFi Site Manager API models
//!
//! Field names follow the API's camelCase JSON. Only the fields callers
//! commonly need are typed; everything else lands in `extra` so newer
//! server fields survive a round trip.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response envelope shared by every endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponseEnvelope<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Cursor for the following page; absent on the last page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl<T> ApiResponseEnvelope<T> {
    /// Wrap `data` the way the API would
    pub fn new(data: T) -> Self {
        Self {
            data,
            http_status_code: Some(200),
            trace_id: None,
            next_token: None,
        }
    }

    /// Whether another page can be fetched with `next_token`
    pub fn has_next_page(&self) -> bool {
        self.next_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Console or gateway registered with Site Manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Host {
    pub id: String,
    #[serde(default)]
    pub hardware_id: Option<String>,
    #[serde(default, rename = "type")]
    pub host_type: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub owner: Option<bool>,
    #[serde(default)]
    pub is_blocked: Option<bool>,
    #[serde(default)]
    pub registration_time: Option<String>, // RFC 3339
    #[serde(default)]
    pub last_connection_state_change: Option<String>, // RFC 3339
    #[serde(default)]
    pub latest_backup_time: Option<String>, // RFC 3339
    #[serde(default)]
    pub reported_state: Option<Value>,
    #[serde(default)]
    pub user_data: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Site hosted on a console
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub site_id: String,
    #[serde(default)]
    pub host_id: Option<String>,
    #[serde(default)]
    pub meta: Option<SiteMeta>,
    #[serde(default)]
    pub statistics: Option<Value>,
    #[serde(default)]
    pub permission: Option<String>,
    #[serde(default)]
    pub is_owner: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Descriptive site fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteMeta {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub gateway_mac: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Devices grouped by the host that manages them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostDevices {
    pub host_id: String,
    #[serde(default)]
    pub host_name: Option<String>,
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub updated_at: Option<String>, // RFC 3339
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Adopted UniFi device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub shortname: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub product_line: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub firmware_status: Option<String>,
    #[serde(default)]
    pub is_console: Option<bool>,
    #[serde(default)]
    pub is_managed: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// ISP metrics for one site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IspMetrics {
    #[serde(default)]
    pub metric_type: Option<String>,
    #[serde(default)]
    pub host_id: Option<String>,
    #[serde(default)]
    pub site_id: Option<String>,
    #[serde(default)]
    pub periods: Vec<IspMetricPeriod>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One sample window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IspMetricPeriod {
    #[serde(default)]
    pub metric_time: Option<String>, // RFC 3339
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub data: Value,
}

/// Body returned by the metrics query endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IspMetricsQueryResult {
    #[serde(default)]
    pub metrics: Vec<IspMetrics>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// SD-WAN configuration summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdWanConfig {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub config_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Deployment status of an SD-WAN configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdWanConfigStatus {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub fingerprint: Option<String>,
    #[serde(default)]
    pub updated_at: Option<Value>,
    #[serde(default)]
    pub hubs: Vec<Value>,
    #[serde(default)]
    pub spokes: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_host_page_decodes() {
        let body = json!({
            "data": [{
                "id": "900A6F00301100000000074A6BA90000000007A3387E0000000063EC9853:123456789",
                "hardwareId": "eae0f123-0000-5111-b111-f74a62f6ed6b",
                "type": "console",
                "ipAddress": "192.168.1.1",
                "owner": true,
                "isBlocked": false,
                "registrationTime": "2024-06-19T13:41:43Z",
                "reportedState": {"hostname": "udm-pro"},
                "firmwareRelease": "4.0.6"
            }],
            "httpStatusCode": 200,
            "traceId": "a7dc15e0eb4527142d7823515b15f87d",
            "nextToken": "ba4b1c4a-fd24-4c57-b27a-20ed1e6a8ce2"
        });

        let page: ApiResponseEnvelope<Vec<Host>> = serde_json::from_value(body).unwrap();
        assert!(page.has_next_page());
        assert_eq!(page.http_status_code, Some(200));
        let host = &page.data[0];
        assert_eq!(host.host_type.as_deref(), Some("console"));
        assert_eq!(host.ip_address.as_deref(), Some("192.168.1.1"));
        assert_eq!(host.extra["firmwareRelease"], json!("4.0.6"));
    }

    #[test]
    fn test_last_page_has_no_token() {
        let page: ApiResponseEnvelope<Vec<Site>> = serde_json::from_value(json!({
            "data": [{"siteId": "661de833b6b2463f0c20b319", "meta": {"name": "default", "timezone": "Europe/Riga"}}],
            "httpStatusCode": 200
        }))
        .unwrap();
        assert!(!page.has_next_page());
        let meta = page.data[0].meta.as_ref().unwrap();
        assert_eq!(meta.name.as_deref(), Some("default"));
    }

    #[test]
    fn test_devices_grouped_by_host() {
        let page: ApiResponseEnvelope<Vec<HostDevices>> = serde_json::from_value(json!({
            "data": [{
                "hostId": "host1",
                "hostName": "unifi.yourdomain.com",
                "devices": [{"id": "F4E2C6EC1B9A", "mac": "F4E2C6EC1B9A", "model": "U6 Lite", "status": "online"}],
                "updatedAt": "2024-06-27T08:52:27Z"
            }]
        }))
        .unwrap();
        assert_eq!(page.data[0].devices[0].model.as_deref(), Some("U6 Lite"));
    }

    #[test]
    fn test_sd_wan_status_decodes() {
        let envelope: ApiResponseEnvelope<SdWanConfigStatus> = serde_json::from_value(json!({
            "data": {"id": "cfg", "fingerprint": "abc", "hubs": [{"id": "h"}], "spokes": [], "lastGeneratedAt": 1}
        }))
        .unwrap();
        assert_eq!(envelope.data.hubs.len(), 1);
        assert_eq!(envelope.data.extra["lastGeneratedAt"], json!(1));
    }
}
