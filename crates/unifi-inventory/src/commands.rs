//! Subcommands and their dispatch onto the API

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use serde_json::Value;
use unifi_client::{
    DeviceQuery, IspMetricsQuery, IspMetricsRange, MetricDuration, MetricType, UniFiApi,
};

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List hosts (one page)
    Hosts {
        #[arg(long, default_value_t = 10)]
        page_size: u32,
        /// Cursor returned as `nextToken` by the previous page
        #[arg(long)]
        next_token: Option<String>,
    },
    /// Show one host
    Host { id: String },
    /// List sites (one page)
    Sites {
        #[arg(long, default_value_t = 10)]
        page_size: u32,
        #[arg(long)]
        next_token: Option<String>,
    },
    /// List devices grouped by host
    Devices {
        /// Restrict to these hosts (repeatable)
        #[arg(long = "host-id")]
        host_ids: Vec<String>,
        /// Only devices processed after this RFC 3339 time
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        page_size: Option<u32>,
        #[arg(long)]
        next_token: Option<String>,
    },
    /// ISP metrics for every site
    IspMetrics {
        /// Sample interval: 5m or 1h
        #[arg(long = "type", default_value = "5m")]
        metric_type: MetricType,
        /// Relative window: 24h, 7d or 30d
        #[arg(long, conflicts_with_all = ["begin", "end"])]
        duration: Option<MetricDuration>,
        #[arg(long)]
        begin: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    /// ISP metrics for selected sites or hosts
    QueryIspMetrics {
        #[arg(long = "type", default_value = "5m")]
        metric_type: MetricType,
        #[arg(long = "site-id")]
        site_ids: Vec<String>,
        #[arg(long = "host-id")]
        host_ids: Vec<String>,
        #[arg(long)]
        begin: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    /// List SD-WAN configurations
    SdWanConfigs,
    /// Show one SD-WAN configuration
    SdWanConfig { id: String },
    /// Deployment status of an SD-WAN configuration
    SdWanStatus { id: String },
}

impl Command {
    /// Short name for error context
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hosts { .. } => "hosts",
            Self::Host { .. } => "host",
            Self::Sites { .. } => "sites",
            Self::Devices { .. } => "devices",
            Self::IspMetrics { .. } => "isp-metrics",
            Self::QueryIspMetrics { .. } => "query-isp-metrics",
            Self::SdWanConfigs => "sd-wan-configs",
            Self::SdWanConfig { .. } => "sd-wan-config",
            Self::SdWanStatus { .. } => "sd-wan-status",
        }
    }
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Run `command` against `api` and return the response envelope as JSON
pub fn run(api: &dyn UniFiApi, command: &Command) -> Result<Value> {
    match command {
        Command::Hosts { page_size, next_token } => to_json(api.list_hosts(*page_size, next_token.as_deref())?),
        Command::Host { id } => to_json(api.get_host_by_id(id)?),
        Command::Sites { page_size, next_token } => to_json(api.list_sites(*page_size, next_token.as_deref())?),
        Command::Devices { host_ids, time, page_size, next_token } => {
            let filter = DeviceQuery {
                host_ids: host_ids.clone(),
                time: time.clone(),
                page_size: *page_size,
                next_token: next_token.clone(),
            };
            to_json(api.list_devices(&filter)?)
        }
        Command::IspMetrics { metric_type, duration, begin, end } => {
            let range = IspMetricsRange {
                duration: *duration,
                begin_timestamp: begin.clone(),
                end_timestamp: end.clone(),
            };
            to_json(api.get_isp_metrics(*metric_type, &range)?)
        }
        Command::QueryIspMetrics { metric_type, site_ids, host_ids, begin, end } => {
            let filter = IspMetricsQuery {
                site_ids: site_ids.clone(),
                host_ids: host_ids.clone(),
                begin_timestamp: begin.clone(),
                end_timestamp: end.clone(),
            };
            to_json(api.query_isp_metrics(*metric_type, &filter)?)
        }
        Command::SdWanConfigs => to_json(api.list_sd_wan_configs()?),
        Command::SdWanConfig { id } => to_json(api.get_sd_wan_config_by_id(id)?),
        Command::SdWanStatus { id } => to_json(api.get_sd_wan_config_status(id)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use unifi_client::MockUniFiClient;
    use unifi_client::mock::helpers;

    #[derive(Parser)]
    struct TestCli {
        #[command(subcommand)]
        command: Command,
    }

    fn parse(args: &[&str]) -> Command {
        TestCli::try_parse_from(std::iter::once("unifi-inventory").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    #[test]
    fn test_parse_hosts_defaults() {
        assert_eq!(parse(&["hosts"]), Command::Hosts { page_size: 10, next_token: None });
    }

    #[test]
    fn test_parse_isp_metrics() {
        let command = parse(&["isp-metrics", "--type", "1h", "--duration", "7d"]);
        assert_eq!(
            command,
            Command::IspMetrics {
                metric_type: MetricType::OneHour,
                duration: Some(MetricDuration::Week),
                begin: None,
                end: None,
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_metric_type() {
        let result = TestCli::try_parse_from(["unifi-inventory", "isp-metrics", "--type", "10m"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_rejects_duration_with_timestamps() {
        let result = TestCli::try_parse_from([
            "unifi-inventory",
            "isp-metrics",
            "--duration",
            "24h",
            "--begin",
            "2024-03-15T10:00:00Z",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_run_hosts_against_mock() {
        let mock = MockUniFiClient::new();
        mock.add_host(helpers::host("host1", "192.168.1.1"));
        mock.add_host(helpers::host("host2", "192.168.1.2"));

        let output = run(&mock, &parse(&["hosts", "--page-size", "1"])).unwrap();
        assert_eq!(output["data"][0]["id"], "host1");
        assert!(output["nextToken"].is_string());

        let token = output["nextToken"].as_str().unwrap();
        let output = run(&mock, &parse(&["hosts", "--page-size", "1", "--next-token", token])).unwrap();
        assert_eq!(output["data"][0]["id"], "host2");
        assert!(output.get("nextToken").is_none());
    }

    #[test]
    fn test_run_devices_filter() {
        let mock = MockUniFiClient::new();
        mock.add_device("host1", helpers::device("dev-a", "U6 Lite"));
        mock.add_device("host2", helpers::device("dev-b", "USW Flex"));

        let output = run(&mock, &parse(&["devices", "--host-id", "host2"])).unwrap();
        assert_eq!(output["data"].as_array().unwrap().len(), 1);
        assert_eq!(output["data"][0]["devices"][0]["model"], "USW Flex");
    }

    #[test]
    fn test_run_surfaces_validation_errors() {
        let mock = MockUniFiClient::new();
        let err = run(&mock, &parse(&["hosts", "--page-size", "500"])).unwrap_err();
        assert!(err.to_string().contains("page_size must be between 1 and 100"));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_run_sd_wan_not_found() {
        let mock = MockUniFiClient::new();
        let err = run(&mock, &parse(&["sd-wan-status", "missing"])).unwrap_err();
        let api_err = err.downcast_ref::<unifi_client::UniFiError>().unwrap();
        assert_eq!(api_err.status(), Some(404));
    }

    #[test]
    fn test_command_names() {
        assert_eq!(parse(&["sd-wan-configs"]).name(), "sd-wan-configs");
        assert_eq!(parse(&["query-isp-metrics", "--site-id", "s1"]).name(), "query-isp-metrics");
    }
}
