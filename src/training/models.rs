//! Regression metrics

use crate::error::{ForecastError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Loss (mean squared error) and mean absolute error of a set of predictions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub loss: f64,
    pub mae: f64,
}

impl RegressionMetrics {
    /// Compute MSE and MAE of `y_pred` against `y_true`
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(ForecastError::ComputationError(format!(
                "Cannot score {} predictions against {} targets",
                y_pred.len(),
                y_true.len()
            )));
        }
        if y_true.is_empty() {
            return Err(ForecastError::ComputationError(
                "Cannot compute metrics on an empty set".to_string(),
            ));
        }

        let n = y_true.len() as f64;
        let (sq, abs) = y_true
            .iter()
            .zip(y_pred.iter())
            .fold((0.0, 0.0), |(sq, abs), (t, p)| {
                let err = t - p;
                (sq + err * err, abs + err.abs())
            });

        Ok(Self {
            loss: sq / n,
            mae: abs / n,
        })
    }

    /// Map metrics computed on a standardized target back to native units.
    ///
    /// With `y = scaled * scale + center`, errors scale linearly, so MSE picks
    /// up `scale^2` and MAE picks up `scale`.
    pub fn rescaled(self, scale: f64) -> Self {
        Self {
            loss: self.loss * scale * scale,
            mae: self.mae * scale.abs(),
        }
    }
}
