use crate::{env_or_default, ConfigError, FromEnv};

/// Connection settings for the external view-stats collector.
///
/// The collector is consumed through its read API only; if it is down the
/// application still serves requests (views degrade to zero).
#[derive(Clone, Debug)]
pub struct StatsConfig {
    pub base_url: String,
    /// Application name reported with recorded hits
    pub app_name: String,
}

impl FromEnv for StatsConfig {
    /// Reads from environment variables with sensible defaults:
    /// - STATS_SERVER_URL: defaults to http://localhost:9090
    /// - STATS_APP_NAME: defaults to "eventboard-api"
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: env_or_default("STATS_SERVER_URL", "http://localhost:9090"),
            app_name: env_or_default("STATS_APP_NAME", "eventboard-api"),
        })
    }
}
