//! Training configuration

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::error::{ForecastError, Result};
use super::{Activation, SplitStrategy};

/// Configuration for one training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of passes over the training subset. Always run to completion.
    pub epochs: usize,

    /// Mini-batch size
    pub batch_size: usize,

    /// Fraction of rows held out for evaluation
    pub test_split: f64,

    /// Hidden layer sizes
    pub hidden_layers: Vec<usize>,

    /// Hidden layer activation
    #[serde(default)]
    pub activation: Activation,

    /// Adam learning rate
    pub learning_rate: f64,

    /// How rows are partitioned into training and held-out subsets
    pub split: SplitStrategy,

    /// Seed for weight initialization and per-epoch shuffling
    pub random_seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 50,
            batch_size: 32,
            test_split: 0.2,
            hidden_layers: vec![64, 32],
            activation: Activation::ReLU,
            learning_rate: 0.001,
            split: SplitStrategy::Sequential,
            random_seed: Some(42),
        }
    }
}

impl TrainingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_test_split(mut self, test_split: f64) -> Self {
        self.test_split = test_split;
        self
    }

    pub fn with_hidden_layers(mut self, layers: Vec<usize>) -> Self {
        self.hidden_layers = layers;
        self
    }

    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_split(mut self, split: SplitStrategy) -> Self {
        self.split = split;
        self
    }

    pub fn with_random_seed(mut self, seed: Option<u64>) -> Self {
        self.random_seed = seed;
        self
    }
}

/// Accepted ranges for caller-supplied hyperparameters
#[derive(Debug, Clone)]
pub struct TrainingBounds {
    pub epochs: RangeInclusive<usize>,
    pub batch_size: RangeInclusive<usize>,
    pub test_split: RangeInclusive<f64>,
}

impl Default for TrainingBounds {
    fn default() -> Self {
        Self {
            epochs: 1..=1000,
            batch_size: 1..=512,
            test_split: 0.1..=0.5,
        }
    }
}

impl TrainingBounds {
    /// Check `config` against these bounds
    pub fn validate(&self, config: &TrainingConfig) -> Result<()> {
        if !self.epochs.contains(&config.epochs) {
            return Err(ForecastError::invalid_parameter(
                "epochs",
                config.epochs,
                format!("must be between {} and {}", self.epochs.start(), self.epochs.end()),
            ));
        }
        if !self.batch_size.contains(&config.batch_size) {
            return Err(ForecastError::invalid_parameter(
                "batch_size",
                config.batch_size,
                format!("must be between {} and {}", self.batch_size.start(), self.batch_size.end()),
            ));
        }
        if !self.test_split.contains(&config.test_split) {
            return Err(ForecastError::invalid_parameter(
                "test_split",
                config.test_split,
                format!("must be between {} and {}", self.test_split.start(), self.test_split.end()),
            ));
        }
        if config.hidden_layers.iter().any(|&units| units == 0) {
            return Err(ForecastError::invalid_parameter(
                "hidden_layers",
                format!("{:?}", config.hidden_layers),
                "every layer needs at least one unit",
            ));
        }
        if !(config.learning_rate.is_finite() && config.learning_rate > 0.0) {
            return Err(ForecastError::invalid_parameter(
                "learning_rate",
                config.learning_rate,
                "must be a positive finite number",
            ));
        }
        Ok(())
    }
}
