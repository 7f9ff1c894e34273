//! HTTP client for the view statistics collector.
//!
//! The collector records endpoint hits and serves aggregated view counts
//! over a time window. All timestamps cross the wire in the collector's
//! flat `YYYY-MM-DD HH:MM:SS` format, in UTC.

pub mod error;
pub mod types;

pub use error::{Result, StatsClientError};
pub use types::{EndpointHit, TIMESTAMP_FORMAT, ViewStats, format_timestamp};

use chrono::{DateTime, Utc};

pub struct StatsClient {
    client: reqwest::Client,
    base_url: String,
    app: String,
}

impl StatsClient {
    /// `base_url` without a trailing slash, e.g. `http://stats:9090`.
    pub fn new(base_url: String, app: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            app,
        }
    }

    /// Record one endpoint hit.
    pub async fn record_hit(&self, uri: &str, ip: &str) -> Result<()> {
        let hit = EndpointHit::new(&self.app, uri, ip, Utc::now());

        let url = format!("{}/hit", self.base_url);
        let resp = self.client.post(&url).json(&hit).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StatsClientError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        tracing::debug!(uri, "Recorded endpoint hit");
        Ok(())
    }

    /// Aggregated hit counts per URI over `[start, end]`. With `unique` set,
    /// repeat hits from the same IP count once.
    pub async fn get_stats(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        uris: &[String],
        unique: bool,
    ) -> Result<Vec<ViewStats>> {
        let url = format!("{}/stats", self.base_url);
        let mut query: Vec<(&str, String)> = vec![
            ("start", format_timestamp(start)),
            ("end", format_timestamp(end)),
            ("unique", unique.to_string()),
        ];
        for uri in uris {
            query.push(("uris", uri.clone()));
        }

        let resp = self.client.get(&url).query(&query).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StatsClientError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let stats: Vec<ViewStats> = resp.json().await?;
        Ok(stats)
    }
}
