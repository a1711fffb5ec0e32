//! Fixture builders for UniFi models
//!
//! Fill the required fields and leave the rest empty so tests only spell
//! out what they assert on.

use crate::models::*;
use serde_json::{Map, Value, json};

/// Host with an id and IP address
pub fn host(id: &str, ip_address: &str) -> Host {
    Host {
        id: id.to_string(),
        hardware_id: None,
        host_type: Some("console".to_string()),
        ip_address: Some(ip_address.to_string()),
        owner: Some(true),
        is_blocked: Some(false),
        registration_time: None,
        last_connection_state_change: None,
        latest_backup_time: None,
        reported_state: None,
        user_data: None,
        extra: Map::new(),
    }
}

/// Site with a display name
pub fn site(site_id: &str, name: &str) -> Site {
    Site {
        site_id: site_id.to_string(),
        host_id: None,
        meta: Some(SiteMeta {
            name: Some(name.to_string()),
            desc: None,
            timezone: None,
            gateway_mac: None,
            extra: Map::new(),
        }),
        statistics: None,
        permission: Some("admin".to_string()),
        is_owner: Some(true),
        extra: Map::new(),
    }
}

/// Online device of the given model
pub fn device(id: &str, model: &str) -> Device {
    Device {
        id: id.to_string(),
        mac: Some(id.to_string()),
        name: None,
        model: Some(model.to_string()),
        shortname: None,
        ip: None,
        product_line: Some("network".to_string()),
        status: Some("online".to_string()),
        version: None,
        firmware_status: None,
        is_console: Some(false),
        is_managed: Some(true),
        extra: Map::new(),
    }
}

/// Device group for one host
pub fn host_devices(host_id: &str, devices: Vec<Device>) -> HostDevices {
    HostDevices {
        host_id: host_id.to_string(),
        host_name: None,
        devices,
        updated_at: None,
        extra: Map::new(),
    }
}

/// Metrics with a single empty sample
pub fn isp_metrics(site_id: &str, host_id: &str) -> IspMetrics {
    IspMetrics {
        metric_type: None,
        host_id: Some(host_id.to_string()),
        site_id: Some(site_id.to_string()),
        periods: vec![IspMetricPeriod {
            metric_time: Some("2024-03-15T10:00:00Z".to_string()),
            version: Some("1".to_string()),
            data: json!({"wan": {"avgLatency": 12, "uptime": 100}}),
        }],
        extra: Map::new(),
    }
}

/// SD-WAN configuration summary
pub fn sd_wan_config(id: &str, name: &str) -> SdWanConfig {
    SdWanConfig {
        id: id.to_string(),
        name: Some(name.to_string()),
        config_type: Some("sdwan-hbsp".to_string()),
        extra: Map::new(),
    }
}

/// Status with no hubs or spokes
pub fn sd_wan_status(id: &str) -> SdWanConfigStatus {
    SdWanConfigStatus {
        id: Some(id.to_string()),
        fingerprint: None,
        updated_at: Some(Value::Null),
        hubs: Vec::new(),
        spokes: Vec::new(),
        extra: Map::new(),
    }
}
