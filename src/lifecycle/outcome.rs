//! Request parameters and operation results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Caller-supplied Train hyperparameters; unset fields use the configured defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainParams {
    pub epochs: Option<usize>,
    pub batch_size: Option<usize>,
    pub test_split: Option<f64>,
}

impl TrainParams {
    pub fn new(epochs: usize, batch_size: usize, test_split: f64) -> Self {
        Self {
            epochs: Some(epochs),
            batch_size: Some(batch_size),
            test_split: Some(test_split),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainSummary {
    pub status: String,
    pub message: String,
    pub model_id: String,
    /// Wall-clock seconds for the whole Train call
    pub training_time: f64,
    /// Cleaned rows x (features + target)
    pub data_shape: (usize, usize),
    pub train_samples: usize,
    pub test_samples: usize,
    /// Held-out loss (MSE), native units
    pub loss: f64,
    /// Held-out MAE, native units
    pub mae: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionOutcome {
    pub status: String,
    pub prediction: f64,
    pub model_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub status: String,
    pub model_id: String,
    pub loss: f64,
    pub mae: f64,
    /// Rows scored
    pub test_samples: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub model_loaded: bool,
    pub model_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}
