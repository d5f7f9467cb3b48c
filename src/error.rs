//! Error types for the model lifecycle

use serde::Serialize;
use thiserror::Error;

/// Result type alias for lifecycle operations
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Coarse classification reported to callers.
///
/// Callers use this to tell "bad input" apart from "nothing trained yet"
/// and from failures inside the numeric routines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Internal,
}

/// Main error type
#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Feature count mismatch: expected {expected} features, got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },

    #[error("No model loaded. Train a model first.")]
    ModelNotLoaded,

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ForecastError {
    /// Classify this error for the caller
    pub fn kind(&self) -> ErrorKind {
        match self {
            ForecastError::DataError(_)
            | ForecastError::ValidationError(_)
            | ForecastError::InvalidParameter { .. }
            | ForecastError::FeatureMismatch { .. } => ErrorKind::Validation,
            ForecastError::ModelNotLoaded => ErrorKind::NotFound,
            ForecastError::ModelNotFitted
            | ForecastError::TrainingError(_)
            | ForecastError::ComputationError(_)
            | ForecastError::IoError(_)
            | ForecastError::SerializationError(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn invalid_parameter(
        name: &str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        ForecastError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<polars::error::PolarsError> for ForecastError {
    fn from(err: polars::error::PolarsError) -> Self {
        ForecastError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for ForecastError {
    fn from(err: ndarray::ShapeError) -> Self {
        ForecastError::ComputationError(err.to_string())
    }
}
