use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("prediction request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("prediction service returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed prediction response: {0}")]
    Decode(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse settings file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid prediction service url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}
