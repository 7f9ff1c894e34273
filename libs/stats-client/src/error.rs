use thiserror::Error;

pub type Result<T> = std::result::Result<T, StatsClientError>;

#[derive(Debug, Error)]
pub enum StatsClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Collector error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for StatsClientError {
    fn from(err: reqwest::Error) -> Self {
        StatsClientError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for StatsClientError {
    fn from(err: serde_json::Error) -> Self {
        StatsClientError::Parse(err.to_string())
    }
}
