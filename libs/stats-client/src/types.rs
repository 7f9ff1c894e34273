use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp format the collector speaks, in UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One recorded request, as sent to the collector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointHit {
    /// Identifier of the service that recorded the hit
    pub app: String,
    pub uri: String,
    pub ip: String,
    pub timestamp: String,
}

impl EndpointHit {
    pub fn new(app: &str, uri: &str, ip: &str, at: DateTime<Utc>) -> Self {
        Self {
            app: app.to_string(),
            uri: uri.to_string(),
            ip: ip.to_string(),
            timestamp: format_timestamp(at),
        }
    }
}

/// Aggregated hit count for one URI
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewStats {
    pub app: String,
    pub uri: String,
    pub hits: i64,
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}
