//! Model lifecycle
//!
//! The three public operations (Train, Predict, Evaluate) plus Info and
//! Health, coordinating preprocessing, training and the registry.

mod config;
mod manager;
mod outcome;

pub use config::LifecycleConfig;
pub use manager::ModelLifecycle;
pub use outcome::{EvaluationOutcome, HealthStatus, PredictionOutcome, TrainParams, TrainSummary};
