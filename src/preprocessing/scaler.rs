//! Feature scaling implementations
//!
//! Scalers are fitted once on training data and then replayed unchanged for
//! every later prediction or evaluation.

use crate::error::{ForecastError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Type of scaler to use
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScalerType {
    /// Standard scaling (z-score normalization): (x - mean) / std
    Standard,
    /// Min-Max scaling: (x - min) / (max - min)
    MinMax,
    /// No scaling
    None,
}

/// Parameters for one fitted column
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScalerParams {
    center: f64, // mean or min
    scale: f64,  // std or range
}

/// Column-wise scaler over dense matrices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    scaler_type: ScalerType,
    params: Vec<ScalerParams>,
    is_fitted: bool,
}

impl Scaler {
    /// Create a new scaler
    pub fn new(scaler_type: ScalerType) -> Self {
        Self {
            scaler_type,
            params: Vec::new(),
            is_fitted: false,
        }
    }

    pub fn scaler_type(&self) -> ScalerType {
        self.scaler_type
    }

    /// Number of columns this scaler was fitted on
    pub fn n_columns(&self) -> usize {
        self.params.len()
    }

    /// Fit the scaler to the columns of `x`
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        if x.nrows() == 0 {
            return Err(ForecastError::ValidationError(
                "Cannot fit scaler on an empty matrix".to_string(),
            ));
        }

        self.params = x
            .columns()
            .into_iter()
            .map(|col| self.compute_params(&col.to_vec()))
            .collect();
        self.is_fitted = true;
        Ok(self)
    }

    /// Fit on a single vector, e.g. the regression target
    pub fn fit_vector(&mut self, y: &Array1<f64>) -> Result<&mut Self> {
        self.fit(&y.clone().insert_axis(Axis(1)))
    }

    /// Transform the data
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_columns(x.ncols())?;

        let mut result = x.clone();
        for (mut col, params) in result.columns_mut().into_iter().zip(&self.params) {
            col.mapv_inplace(|v| (v - params.center) / params.scale);
        }
        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    /// Inverse transform the data
    pub fn inverse_transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_columns(x.ncols())?;

        let mut result = x.clone();
        for (mut col, params) in result.columns_mut().into_iter().zip(&self.params) {
            col.mapv_inplace(|v| v * params.scale + params.center);
        }
        Ok(result)
    }

    /// Transform a vector with a scaler fitted by [`Scaler::fit_vector`]
    pub fn transform_vector(&self, y: &Array1<f64>) -> Result<Array1<f64>> {
        let scaled = self.transform(&y.clone().insert_axis(Axis(1)))?;
        Ok(scaled.column(0).to_owned())
    }

    /// Inverse of [`Scaler::transform_vector`]
    pub fn inverse_vector(&self, y: &Array1<f64>) -> Result<Array1<f64>> {
        let unscaled = self.inverse_transform(&y.clone().insert_axis(Axis(1)))?;
        Ok(unscaled.column(0).to_owned())
    }

    /// Multiplicative factor between scaled and native units for `column`.
    ///
    /// Errors measured in scaled space are multiplied by this factor to get
    /// native-unit errors (squared errors by its square).
    pub fn scale_factor(&self, column: usize) -> Result<f64> {
        if !self.is_fitted {
            return Err(ForecastError::ModelNotFitted);
        }
        self.params
            .get(column)
            .map(|p| p.scale)
            .ok_or(ForecastError::FeatureMismatch {
                expected: self.params.len(),
                actual: column + 1,
            })
    }

    fn check_columns(&self, n_cols: usize) -> Result<()> {
        if !self.is_fitted {
            return Err(ForecastError::ModelNotFitted);
        }
        if n_cols != self.params.len() {
            return Err(ForecastError::FeatureMismatch {
                expected: self.params.len(),
                actual: n_cols,
            });
        }
        Ok(())
    }

    fn compute_params(&self, values: &[f64]) -> ScalerParams {
        match self.scaler_type {
            ScalerType::Standard => {
                let n = values.len() as f64;
                let mean = values.iter().sum::<f64>() / n;
                let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
                let std = var.sqrt();
                ScalerParams {
                    center: mean,
                    scale: if std == 0.0 || !std.is_finite() { 1.0 } else { std },
                }
            }
            ScalerType::MinMax => {
                let (min, max) = values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                });
                let range = max - min;
                ScalerParams {
                    center: min,
                    scale: if range == 0.0 || !range.is_finite() { 1.0 } else { range },
                }
            }
            ScalerType::None => ScalerParams {
                center: 0.0,
                scale: 1.0,
            },
        }
    }
}
