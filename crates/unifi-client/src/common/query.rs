//! Query parameters and input validation for UniFi API endpoints
//!
//! Everything here runs before a request is built, so rejected input never
//! reaches the network.

use crate::error::UniFiError;
use chrono::{DateTime, FixedOffset};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default page size for list endpoints
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Largest page size the API accepts
pub const MAX_PAGE_SIZE: u32 = 100;

/// Reject page sizes outside `1..=100`
pub fn validate_page_size(page_size: u32) -> Result<(), UniFiError> {
    if (1..=MAX_PAGE_SIZE).contains(&page_size) {
        Ok(())
    } else {
        Err(UniFiError::validation(format!(
            "page_size must be between 1 and {MAX_PAGE_SIZE}"
        )))
    }
}

/// Reject empty identifiers; `name` is used in the message
pub fn validate_id(name: &str, value: &str) -> Result<(), UniFiError> {
    if value.trim().is_empty() {
        return Err(UniFiError::validation(format!("{name} cannot be empty")));
    }
    Ok(())
}

/// Parse an RFC 3339 timestamp with an explicit zone (`Z` or `+hh:mm`)
pub fn validate_rfc3339(timestamp: &str) -> Result<DateTime<FixedOffset>, UniFiError> {
    DateTime::parse_from_rfc3339(timestamp).map_err(|e| {
        UniFiError::validation(format!(
            "Invalid RFC3339 timestamp format: {timestamp:?} ({e})"
        ))
    })
}

/// Validate both ends of a range and require `end > begin`
pub fn validate_timestamp_range(begin: Option<&str>, end: Option<&str>) -> Result<(), UniFiError> {
    let begin = begin.map(validate_rfc3339).transpose()?;
    let end = end.map(validate_rfc3339).transpose()?;

    if let (Some(begin), Some(end)) = (begin, end) {
        if end <= begin {
            return Err(UniFiError::validation(
                "end_timestamp must be strictly greater than begin_timestamp",
            ));
        }
    }
    Ok(())
}

/// Pagination pairs shared by list endpoints
pub fn page_params(page_size: u32, next_token: Option<&str>) -> Result<Vec<(String, String)>, UniFiError> {
    validate_page_size(page_size)?;
    let mut params = vec![("pageSize".to_string(), page_size.to_string())];
    if let Some(token) = next_token.filter(|t| !t.is_empty()) {
        params.push(("nextToken".to_string(), token.to_string()));
    }
    Ok(params)
}

/// Bytes escaped inside a path segment: everything except RFC 3986 `pchar`
const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=')
    .remove(b':')
    .remove(b'@');

/// Percent-encode one path segment
///
/// Host ids look like `<hex>:<number>`; the `:` goes out as-is.
pub fn path_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT_ENCODE_SET).to_string()
}

/// Sampling interval of ISP metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricType {
    /// 5-minute samples
    #[serde(rename = "5m")]
    FiveMinutes,
    /// 1-hour samples
    #[serde(rename = "1h")]
    OneHour,
}

impl MetricType {
    /// Wire representation
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FiveMinutes => "5m",
            Self::OneHour => "1h",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricType {
    type Err = UniFiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "5m" => Ok(Self::FiveMinutes),
            "1h" => Ok(Self::OneHour),
            other => Err(UniFiError::validation(format!(
                "type must be either '5m' or '1h', got {other:?}"
            ))),
        }
    }
}

/// Relative window for ISP metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricDuration {
    /// Last 24 hours, 5-minute samples only
    #[serde(rename = "24h")]
    Day,
    /// Last 7 days, hourly samples only
    #[serde(rename = "7d")]
    Week,
    /// Last 30 days, hourly samples only
    #[serde(rename = "30d")]
    Month,
}

impl MetricDuration {
    /// Wire representation
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "24h",
            Self::Week => "7d",
            Self::Month => "30d",
        }
    }

    /// Whether the API serves this window at `metric_type` resolution
    pub fn supports(self, metric_type: MetricType) -> bool {
        matches!(
            (self, metric_type),
            (Self::Day, MetricType::FiveMinutes) | (Self::Week | Self::Month, MetricType::OneHour)
        )
    }
}

impl fmt::Display for MetricDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricDuration {
    type Err = UniFiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "24h" => Ok(Self::Day),
            "7d" => Ok(Self::Week),
            "30d" => Ok(Self::Month),
            other => Err(UniFiError::validation(format!(
                "duration must be one of '24h', '7d' or '30d', got {other:?}"
            ))),
        }
    }
}

/// Filters for `GET /devices`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceQuery {
    /// Only devices managed by these hosts
    pub host_ids: Vec<String>,
    /// Last processed timestamp, RFC 3339
    pub time: Option<String>,
    /// Page size; the API default applies when unset
    pub page_size: Option<u32>,
    /// Cursor from a previous page
    pub next_token: Option<String>,
}

impl DeviceQuery {
    /// Validate and render as query pairs
    pub fn to_params(&self) -> Result<Vec<(String, String)>, UniFiError> {
        let mut params = Vec::new();
        let host_ids: Vec<&str> = self
            .host_ids
            .iter()
            .map(String::as_str)
            .filter(|id| !id.is_empty())
            .collect();
        if !host_ids.is_empty() {
            params.push(("hostIds".to_string(), host_ids.join(",")));
        }
        if let Some(time) = &self.time {
            validate_rfc3339(time)?;
            params.push(("time".to_string(), time.clone()));
        }
        if let Some(page_size) = self.page_size {
            validate_page_size(page_size)?;
            params.push(("pageSize".to_string(), page_size.to_string()));
        }
        if let Some(token) = self.next_token.as_deref().filter(|t| !t.is_empty()) {
            params.push(("nextToken".to_string(), token.to_string()));
        }
        Ok(params)
    }
}

/// Window for `GET /ea/isp-metrics/{type}`: a duration or explicit timestamps
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IspMetricsRange {
    /// Relative window; exclusive with the timestamps
    pub duration: Option<MetricDuration>,
    /// Start, RFC 3339
    pub begin_timestamp: Option<String>,
    /// End, RFC 3339
    pub end_timestamp: Option<String>,
}

impl IspMetricsRange {
    /// Relative window
    pub fn duration(duration: MetricDuration) -> Self {
        Self {
            duration: Some(duration),
            ..Self::default()
        }
    }

    /// Explicit window
    pub fn between(begin: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            duration: None,
            begin_timestamp: Some(begin.into()),
            end_timestamp: Some(end.into()),
        }
    }

    /// Validate against `metric_type` and render as query pairs
    pub fn to_params(&self, metric_type: MetricType) -> Result<Vec<(String, String)>, UniFiError> {
        let has_timestamps = self.begin_timestamp.is_some() || self.end_timestamp.is_some();
        let mut params = Vec::new();

        if let Some(duration) = self.duration {
            if has_timestamps {
                return Err(UniFiError::validation(
                    "duration cannot be used with begin_timestamp or end_timestamp",
                ));
            }
            if !duration.supports(metric_type) {
                return Err(UniFiError::validation(format!(
                    "duration '{duration}' is not available for type '{metric_type}'"
                )));
            }
            params.push(("duration".to_string(), duration.to_string()));
        }

        validate_timestamp_range(self.begin_timestamp.as_deref(), self.end_timestamp.as_deref())?;
        if let Some(begin) = &self.begin_timestamp {
            params.push(("beginTimestamp".to_string(), begin.clone()));
        }
        if let Some(end) = &self.end_timestamp {
            params.push(("endTimestamp".to_string(), end.clone()));
        }
        Ok(params)
    }
}

/// Body of `POST /ea/isp-metrics/{type}/query`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IspMetricsQuery {
    /// Sites to include
    pub site_ids: Vec<String>,
    /// Hosts to include
    pub host_ids: Vec<String>,
    /// Start, RFC 3339
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_timestamp: Option<String>,
    /// End, RFC 3339
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_timestamp: Option<String>,
}

impl IspMetricsQuery {
    /// Validate and render as a JSON body
    pub fn to_body(&self) -> Result<serde_json::Value, UniFiError> {
        validate_timestamp_range(self.begin_timestamp.as_deref(), self.end_timestamp.as_deref())?;
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn assert_validation(result: Result<impl fmt::Debug, UniFiError>, needle: &str) {
        match result {
            Err(UniFiError::Validation(message)) => {
                assert!(message.contains(needle), "{message:?} does not mention {needle:?}");
            }
            other => panic!("expected validation error mentioning {needle:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_page_size_bounds() {
        assert!(validate_page_size(1).is_ok());
        assert!(validate_page_size(100).is_ok());
        assert_validation(validate_page_size(0), "page_size must be between 1 and 100");
        assert_validation(validate_page_size(101), "page_size must be between 1 and 100");
    }

    #[test]
    fn test_page_params() {
        let params = page_params(10, None).unwrap();
        assert_eq!(params, vec![("pageSize".to_string(), "10".to_string())]);

        let params = page_params(50, Some("token123")).unwrap();
        assert_eq!(params[1], ("nextToken".to_string(), "token123".to_string()));
    }

    #[test]
    fn test_rfc3339_with_z_suffix() {
        let parsed = validate_rfc3339("2024-03-15T14:30:45.123Z").unwrap();
        assert_eq!(parsed.year(), 2024);
        assert_eq!(parsed.month(), 3);
        assert_eq!(parsed.day(), 15);
    }

    #[test]
    fn test_rfc3339_with_offset() {
        assert!(validate_rfc3339("2024-03-15T14:30:45.123+05:30").is_ok());
    }

    #[test]
    fn test_rfc3339_rejects_date_only() {
        assert_validation(validate_rfc3339("2024-03-15"), "Invalid RFC3339 timestamp format");
        assert_validation(validate_rfc3339("invalid-timestamp"), "Invalid RFC3339 timestamp");
    }

    #[test]
    fn test_timestamp_range() {
        assert!(validate_timestamp_range(Some("2024-03-15T10:00:00.000Z"), Some("2024-03-15T14:00:00.000Z")).is_ok());
        assert_validation(
            validate_timestamp_range(Some("2024-03-15T14:00:00.000Z"), Some("2024-03-15T10:00:00.000Z")),
            "must be strictly greater",
        );
        assert_validation(
            validate_timestamp_range(Some("2024-03-15T10:00:00Z"), Some("2024-03-15T10:00:00Z")),
            "must be strictly greater",
        );
        assert!(validate_timestamp_range(None, None).is_ok());
        assert!(validate_timestamp_range(Some("2024-03-15T10:00:00.000Z"), None).is_ok());
        assert!(validate_timestamp_range(None, Some("2024-03-15T14:00:00.000Z")).is_ok());
    }

    #[test]
    fn test_metric_type_parsing() {
        assert_eq!("5m".parse::<MetricType>().unwrap(), MetricType::FiveMinutes);
        assert_eq!("1h".parse::<MetricType>().unwrap(), MetricType::OneHour);
        assert_validation("10m".parse::<MetricType>(), "must be either '5m' or '1h'");
    }

    #[test]
    fn test_metric_duration_parsing() {
        assert_eq!("24h".parse::<MetricDuration>().unwrap(), MetricDuration::Day);
        assert_eq!("30d".parse::<MetricDuration>().unwrap(), MetricDuration::Month);
        assert_validation("1y".parse::<MetricDuration>(), "duration must be one of");
    }

    #[test]
    fn test_duration_matches_resolution() {
        assert!(MetricDuration::Day.supports(MetricType::FiveMinutes));
        assert!(!MetricDuration::Day.supports(MetricType::OneHour));
        assert!(MetricDuration::Week.supports(MetricType::OneHour));
        assert!(!MetricDuration::Month.supports(MetricType::FiveMinutes));

        let range = IspMetricsRange::duration(MetricDuration::Week);
        assert_validation(range.to_params(MetricType::FiveMinutes), "not available for type '5m'");
    }

    #[test]
    fn test_metrics_range_duration() {
        let params = IspMetricsRange::duration(MetricDuration::Day)
            .to_params(MetricType::FiveMinutes)
            .unwrap();
        assert_eq!(params, vec![("duration".to_string(), "24h".to_string())]);
    }

    #[test]
    fn test_metrics_range_timestamps() {
        let params = IspMetricsRange::between("2024-03-15T10:00:00.000Z", "2024-03-15T14:00:00.000Z")
            .to_params(MetricType::OneHour)
            .unwrap();
        assert_eq!(params[0], ("beginTimestamp".to_string(), "2024-03-15T10:00:00.000Z".to_string()));
        assert_eq!(params[1], ("endTimestamp".to_string(), "2024-03-15T14:00:00.000Z".to_string()));
    }

    #[test]
    fn test_duration_with_timestamps_rejected() {
        let range = IspMetricsRange {
            duration: Some(MetricDuration::Day),
            begin_timestamp: Some("2024-03-15T10:00:00.000Z".to_string()),
            end_timestamp: None,
        };
        assert_validation(range.to_params(MetricType::FiveMinutes), "cannot be used with");
    }

    #[test]
    fn test_device_query_params() {
        let query = DeviceQuery {
            host_ids: vec!["host1".to_string(), "host2".to_string()],
            time: Some("2024-03-15T14:30:45.123Z".to_string()),
            page_size: Some(25),
            next_token: Some("next".to_string()),
        };
        let params = query.to_params().unwrap();
        assert_eq!(params[0], ("hostIds".to_string(), "host1,host2".to_string()));
        assert_eq!(params[1], ("time".to_string(), "2024-03-15T14:30:45.123Z".to_string()));
        assert_eq!(params[2], ("pageSize".to_string(), "25".to_string()));
        assert_eq!(params[3], ("nextToken".to_string(), "next".to_string()));

        assert!(DeviceQuery::default().to_params().unwrap().is_empty());
    }

    #[test]
    fn test_device_query_invalid_time() {
        let query = DeviceQuery {
            time: Some("invalid-timestamp".to_string()),
            ..DeviceQuery::default()
        };
        assert_validation(query.to_params(), "Invalid RFC3339 timestamp");
    }

    #[test]
    fn test_metrics_query_body() {
        let query = IspMetricsQuery {
            site_ids: vec!["site1".to_string(), "site2".to_string()],
            host_ids: vec!["host1".to_string()],
            ..IspMetricsQuery::default()
        };
        let body = query.to_body().unwrap();
        assert_eq!(body["siteIds"], serde_json::json!(["site1", "site2"]));
        assert_eq!(body["hostIds"], serde_json::json!(["host1"]));
        assert!(body.get("beginTimestamp").is_none());
    }

    #[test]
    fn test_path_segment_encoding() {
        assert_eq!(path_segment("host123"), "host123");
        assert_eq!(path_segment("a/b c"), "a%2Fb%20c");
        assert_eq!(path_segment("50%?#"), "50%25%3F%23");
    }

    #[test]
    fn test_path_segment_keeps_pchar_delimiters() {
        assert_eq!(
            path_segment("900A6F00301100000000074A6BA90000000007A3387E0000000063EC9853:123456789"),
            "900A6F00301100000000074A6BA90000000007A3387E0000000063EC9853:123456789"
        );
        assert_eq!(path_segment("user@site;v=1"), "user@site;v=1");
    }
}
