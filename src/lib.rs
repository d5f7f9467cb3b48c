//! stock-ann - feed-forward regression on tabular time-series data
//!
//! Trains a small neural network on OHLCV-style CSV files and serves
//! predictions and evaluation metrics for the current model.
//!
//! # Modules
//!
//! - [`preprocessing`] - CSV parsing, schema resolution, cleaning, scaling
//! - [`training`] - Train/held-out split, MLP regressor, metrics, trainer
//! - [`registry`] - Single-slot store for the current model and its metadata
//! - [`lifecycle`] - Train / Predict / Evaluate / Info orchestration
//! - [`server`] - HTTP API
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use stock_ann::prelude::*;
//!
//! let lifecycle = ModelLifecycle::new(LifecycleConfig::default());
//! let csv = std::fs::read("prices.csv")?;
//! let summary = lifecycle.train(&csv, TrainParams::new(20, 32, 0.2))?;
//! let outcome = lifecycle.predict(&[251.55, 253.67, 247.14, 247.45])?;
//! println!("{} -> {}", summary.model_id, outcome.prediction);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;

pub mod preprocessing;
pub mod training;
pub mod registry;
pub mod lifecycle;

pub mod server;
pub mod cli;

pub use error::{ErrorKind, ForecastError, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{ErrorKind, ForecastError, Result};
    pub use crate::lifecycle::{
        EvaluationOutcome, HealthStatus, LifecycleConfig, ModelLifecycle, PredictionOutcome,
        TrainParams, TrainSummary,
    };
    pub use crate::preprocessing::{PreprocessingConfig, ScalerType, TabularPreprocessor};
    pub use crate::registry::{ModelMetadata, ModelRegistry, RegistryEntry};
    pub use crate::training::{
        ModelTrainer, RegressionMetrics, SplitStrategy, TrainedArtifact, TrainingBounds,
        TrainingConfig,
    };
}
