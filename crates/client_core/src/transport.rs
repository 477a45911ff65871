use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::Prediction,
    protocol::{PredictRequest, PredictResponse, PREDICT_PATH},
};
use tracing::debug;

use crate::{config::ClientSettings, error::PredictionError};

/// The remote classifier, seen as an opaque collaborator.
#[async_trait]
pub trait PredictionService: Send + Sync {
    async fn predict(&self, text: &str) -> Result<Prediction, PredictionError>;
}

pub struct HttpPredictionService {
    http: Client,
    endpoint: String,
}

impl HttpPredictionService {
    pub fn new(settings: &ClientSettings) -> Result<Self, PredictionError> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(PredictionError::Client)?;

        Ok(Self {
            http,
            endpoint: format!("{}{PREDICT_PATH}", settings.api_base_url),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PredictionService for HttpPredictionService {
    async fn predict(&self, text: &str) -> Result<Prediction, PredictionError> {
        debug!(endpoint = %self.endpoint, chars = text.chars().count(), "posting prediction request");
        let res = self
            .http
            .post(&self.endpoint)
            .json(&PredictRequest {
                text: text.to_string(),
            })
            .send()
            .await
            .map_err(PredictionError::Transport)?;

        let status = res.status();
        if !status.is_success() {
            return Err(PredictionError::Status(status));
        }

        let body = res.bytes().await.map_err(PredictionError::Transport)?;
        let decoded: PredictResponse =
            serde_json::from_slice(&body).map_err(PredictionError::Decode)?;
        Ok(decoded.into())
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
