//! Model training module
//!
//! Provides the regression side of the lifecycle:
//! - Train/held-out partitioning (sequential or seeded shuffle)
//! - Feed-forward neural network regressor trained with Adam
//! - MSE / MAE metrics
//! - The trainer that binds scalers and network into an immutable artifact

mod config;
mod engine;
mod models;
mod optimizer;
mod split;
pub mod neural_network;

pub use config::{TrainingBounds, TrainingConfig};
pub use engine::{ModelTrainer, TrainedArtifact, TrainingOutcome};
pub use models::RegressionMetrics;
pub use neural_network::{Activation, EpochMetrics, FitReport, MLPConfig, MLPRegressor};
pub use optimizer::Adam;
pub use split::{DataSplit, SplitStrategy};
