use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected status from video API: {0}")]
    Status(StatusCode),
    #[error("malformed video API response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("search item is missing `{0}`")]
    MissingField(&'static str),
    #[error("invalid API base url: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no configuration directory available on this platform")]
    NoConfigDir,
    #[error("config file i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config file parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
