//! UniFi Site Manager API Client
//!
//! A synchronous Rust client for the UniFi Site Manager REST API
//! (`https://api.ui.com`). Covers hosts, sites, devices, ISP metrics and
//! SD-WAN configurations.
//!
//! # Example
//!
//! ```no_run
//! use unifi_client::{DeviceQuery, UniFiClient};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = UniFiClient::new("your-api-key")?;
//!
//! // Walk hosts page by page
//! let mut page = client.list_hosts(25, None)?;
//! loop {
//!     for host in &page.data {
//!         println!("{} {:?}", host.id, host.ip_address);
//!     }
//!     match page.next_token.clone() {
//!         Some(token) => page = client.list_hosts(25, Some(&token))?,
//!         None => break,
//!     }
//! }
//!
//! // Devices for two hosts
//! let devices = client.list_devices(&DeviceQuery {
//!     host_ids: vec!["host-a".to_string(), "host-b".to_string()],
//!     ..DeviceQuery::default()
//! })?;
//! # let _ = devices;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Session handling**: sessions are created lazily, expire after a
//!   configurable TTL (55 minutes by default) and are refreshed under a lock
//! - **Auth retry**: a 401/403 triggers one session refresh and one retry
//! - **Validation**: bad arguments are rejected before any request is sent
//! - **Mocking**: the `test-util` feature exposes `MockUniFiClient`

pub mod client;
pub mod common;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
#[path = "trait.rs"]
pub mod unifi_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::UniFiClient;
pub use common::query::{DeviceQuery, IspMetricsQuery, IspMetricsRange, MetricDuration, MetricType};
pub use common::{ApiRequest, ApiResponse, HttpTransport, Transport};
pub use config::ClientConfig;
pub use error::UniFiError;
pub use models::*;
pub use unifi_trait::UniFiApi;
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockUniFiClient;
