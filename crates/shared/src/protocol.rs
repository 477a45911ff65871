use serde::{Deserialize, Serialize};

use crate::domain::{Label, Prediction, Probabilities};

pub const PREDICT_PATH: &str = "/predict";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: Label,
    pub confidence: f64,
    pub probabilities: Probabilities,
}

impl From<PredictResponse> for Prediction {
    fn from(value: PredictResponse) -> Self {
        Self {
            label: value.prediction,
            confidence: value.confidence,
            probabilities: value.probabilities,
        }
    }
}
