//! Train / Predict / Evaluate orchestration

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::{
    EvaluationOutcome, HealthStatus, LifecycleConfig, PredictionOutcome, TrainParams,
    TrainSummary,
};
use crate::error::{ForecastError, Result};
use crate::preprocessing::TabularPreprocessor;
use crate::registry::{ModelIdGenerator, ModelMetadata, ModelRegistry, RegistryEntry};
use crate::training::{ModelTrainer, TrainingBounds, TrainingConfig};

/// Owns the preprocessor, the hyperparameter bounds and the model registry.
///
/// All operations take `&self`; share one instance behind an `Arc` between
/// request handlers.
#[derive(Debug)]
pub struct ModelLifecycle {
    preprocessor: TabularPreprocessor,
    bounds: TrainingBounds,
    defaults: TrainingConfig,
    registry: ModelRegistry,
    ids: ModelIdGenerator,
}

impl Default for ModelLifecycle {
    fn default() -> Self {
        Self::new(LifecycleConfig::default())
    }
}

impl ModelLifecycle {
    pub fn new(config: LifecycleConfig) -> Self {
        Self {
            preprocessor: TabularPreprocessor::new(config.preprocessing),
            bounds: config.bounds,
            defaults: config.defaults,
            registry: ModelRegistry::new(),
            ids: ModelIdGenerator::default(),
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn defaults(&self) -> &TrainingConfig {
        &self.defaults
    }

    /// Merge `params` into the defaults and check the result against the bounds
    pub fn resolve_params(&self, params: TrainParams) -> Result<TrainingConfig> {
        let mut config = self.defaults.clone();
        if let Some(epochs) = params.epochs {
            config.epochs = epochs;
        }
        if let Some(batch_size) = params.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(test_split) = params.test_split {
            config.test_split = test_split;
        }
        self.bounds.validate(&config)?;
        Ok(config)
    }

    /// Train a new model on CSV bytes and make it the current one.
    ///
    /// Nothing is written to the registry unless every step succeeds.
    pub fn train(&self, csv: &[u8], params: TrainParams) -> Result<TrainSummary> {
        let start = Instant::now();
        let config = self.resolve_params(params)?;

        info!(
            bytes = csv.len(),
            epochs = config.epochs,
            batch_size = config.batch_size,
            test_split = config.test_split,
            "Training started"
        );

        let result = self.train_inner(csv, &config, start);
        if let Err(ref e) = result {
            warn!(error = %e, kind = ?e.kind(), "Training failed");
        }
        result
    }

    fn train_inner(&self, csv: &[u8], config: &TrainingConfig, start: Instant) -> Result<TrainSummary> {
        let data = self.preprocessor.process_csv(csv)?;
        let data_shape = data.shape();

        let trainer = ModelTrainer::new(config.clone(), self.preprocessor.config().scaler_type);
        let outcome = trainer.fit(&data)?;

        let created_at = Utc::now();
        let model_id = self.ids.next_id(&created_at);
        let metadata = ModelMetadata {
            model_id: model_id.clone(),
            created_at,
            input_features: data.n_features(),
            feature_names: data.feature_names.clone(),
            target_name: data.target_name.clone(),
            training_samples: outcome.train_samples,
            test_samples: outcome.test_samples,
            epochs: config.epochs,
            batch_size: config.batch_size,
            test_split: config.test_split,
            training_loss: outcome.report.training_loss,
            training_mae: outcome.report.training_mae,
            loss: outcome.test_metrics.loss,
            mae: outcome.test_metrics.mae,
        };

        let entry = RegistryEntry::new(outcome.artifact, metadata)?;
        self.registry.put(entry);

        let training_time = start.elapsed().as_secs_f64();
        info!(
            model_id = %model_id,
            training_time,
            train_samples = outcome.train_samples,
            test_samples = outcome.test_samples,
            loss = outcome.test_metrics.loss,
            mae = outcome.test_metrics.mae,
            "Training completed"
        );

        Ok(TrainSummary {
            status: "success".to_string(),
            message: "Model trained successfully".to_string(),
            model_id,
            training_time,
            data_shape,
            train_samples: outcome.train_samples,
            test_samples: outcome.test_samples,
            loss: outcome.test_metrics.loss,
            mae: outcome.test_metrics.mae,
        })
    }

    /// Predict the target for one feature vector with the current model
    pub fn predict(&self, features: &[f64]) -> Result<PredictionOutcome> {
        if features.is_empty() {
            return Err(ForecastError::ValidationError(
                "Features list cannot be empty".to_string(),
            ));
        }
        if features.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ValidationError(
                "All features must be finite numbers".to_string(),
            ));
        }

        let entry = self.registry.get()?;
        let prediction = entry.artifact.predict_one(features)?;
        if !prediction.is_finite() {
            return Err(ForecastError::ComputationError(
                "Model produced a non-finite prediction".to_string(),
            ));
        }

        info!(model_id = %entry.metadata.model_id, prediction, "Prediction served");

        Ok(PredictionOutcome {
            status: "success".to_string(),
            prediction,
            model_id: entry.metadata.model_id.clone(),
            timestamp: Utc::now(),
        })
    }

    /// Score the current model on every row of a CSV file.
    ///
    /// The file must carry the training features, by name and in order.
    pub fn evaluate(&self, csv: &[u8]) -> Result<EvaluationOutcome> {
        let start = Instant::now();
        let entry = self.registry.get()?;

        let metrics_result = self.score(&entry, csv);
        let (metrics, rows) = match metrics_result {
            Ok(v) => v,
            Err(e) => {
                warn!(model_id = %entry.metadata.model_id, error = %e, "Evaluation failed");
                return Err(e);
            }
        };

        info!(
            model_id = %entry.metadata.model_id,
            rows,
            loss = metrics.loss,
            mae = metrics.mae,
            elapsed_secs = start.elapsed().as_secs_f64(),
            "Evaluation completed"
        );

        Ok(EvaluationOutcome {
            status: "success".to_string(),
            model_id: entry.metadata.model_id.clone(),
            loss: metrics.loss,
            mae: metrics.mae,
            test_samples: rows,
            timestamp: Utc::now(),
        })
    }

    fn score(
        &self,
        entry: &Arc<RegistryEntry>,
        csv: &[u8],
    ) -> Result<(crate::training::RegressionMetrics, usize)> {
        let artifact = &entry.artifact;
        let preprocessor = TabularPreprocessor::new(
            self.preprocessor
                .config()
                .clone()
                .with_target_column(artifact.target_name()),
        );

        let df = preprocessor.read_csv(csv)?;
        let data = preprocessor.process_for_evaluation(&df)?;

        if data.n_features() != artifact.n_features() {
            return Err(ForecastError::FeatureMismatch {
                expected: artifact.n_features(),
                actual: data.n_features(),
            });
        }
        if data.feature_names != artifact.feature_names() {
            return Err(ForecastError::ValidationError(format!(
                "Feature columns {:?} do not match the model's {:?}",
                data.feature_names,
                artifact.feature_names()
            )));
        }

        let metrics = artifact.evaluate(&data.features, &data.target)?;
        Ok((metrics, data.n_rows()))
    }

    /// Metadata of the current model
    pub fn info(&self) -> Result<ModelMetadata> {
        Ok(self.registry.get()?.metadata.clone())
    }

    pub fn health(&self) -> HealthStatus {
        let model_id = self.registry.current_id().ok();
        HealthStatus {
            status: "healthy".to_string(),
            model_loaded: model_id.is_some(),
            model_id,
            timestamp: Utc::now(),
        }
    }

    /// Make a previously exported entry the current model
    pub fn install(&self, entry: RegistryEntry) -> String {
        let model_id = entry.metadata.model_id.clone();
        self.registry.put(entry);
        model_id
    }

    /// Export the current model as JSON
    pub fn export(&self, path: impl AsRef<std::path::Path>) -> Result<String> {
        let entry = self.registry.get()?;
        entry.save(path)?;
        Ok(entry.metadata.model_id.clone())
    }
}
