//! Lifecycle configuration

use crate::preprocessing::PreprocessingConfig;
use crate::training::{SplitStrategy, TrainingBounds, TrainingConfig};

/// Everything the orchestrator needs besides the request itself
#[derive(Debug, Clone, Default)]
pub struct LifecycleConfig {
    pub preprocessing: PreprocessingConfig,
    pub bounds: TrainingBounds,
    /// Applied to any Train parameter the caller leaves unset
    pub defaults: TrainingConfig,
}

impl LifecycleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `TARGET_COLUMN`, `MIN_ROWS`, `SPLIT_SEED`
    /// and `SPLIT_SHUFFLE`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading variables through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(target) = lookup("TARGET_COLUMN") {
            if !target.trim().is_empty() {
                config.preprocessing.target_column = Some(target.trim().to_string());
            }
        }
        if let Some(min_rows) = lookup("MIN_ROWS").and_then(|v| v.trim().parse().ok()) {
            config.preprocessing.min_rows = min_rows;
        }

        let seed: Option<u64> = lookup("SPLIT_SEED").and_then(|v| v.trim().parse().ok());
        if let Some(seed) = seed {
            config.defaults.random_seed = Some(seed);
        }

        let shuffle = lookup("SPLIT_SHUFFLE")
            .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
            .unwrap_or(false);
        if shuffle {
            config.defaults.split = SplitStrategy::Shuffled {
                seed: seed.unwrap_or(42),
            };
        }

        config
    }

    pub fn with_preprocessing(mut self, preprocessing: PreprocessingConfig) -> Self {
        self.preprocessing = preprocessing;
        self
    }

    pub fn with_bounds(mut self, bounds: TrainingBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_defaults(mut self, defaults: TrainingConfig) -> Self {
        self.defaults = defaults;
        self
    }
}
