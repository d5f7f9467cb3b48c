//! Training engine: scaling, network fit and the immutable trained artifact

use crate::error::{ForecastError, Result};
use crate::preprocessing::{ProcessedDataset, Scaler, ScalerType};
use super::{
    EpochMetrics, FitReport, MLPConfig, MLPRegressor, RegressionMetrics,
    TrainingConfig,
};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

/// A fitted network together with the exact preprocessing it was trained under.
///
/// Never mutated after construction. Every call checks the feature count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedArtifact {
    network: MLPRegressor,
    feature_scaler: Scaler,
    target_scaler: Scaler,
    feature_names: Vec<String>,
    target_name: String,
}

impl TrainedArtifact {
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    pub fn network(&self) -> &MLPRegressor {
        &self.network
    }

    /// Predict the target, in native units, for one feature vector
    pub fn predict_one(&self, features: &[f64]) -> Result<f64> {
        self.check_features(features.len())?;
        let x = ArrayView1::from(features).insert_axis(Axis(0)).to_owned();
        let predictions = self.predict(&x)?;
        Ok(predictions[0])
    }

    /// Predict the target, in native units, for every row of `x`
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.check_features(x.ncols())?;
        let scaled = self.feature_scaler.transform(x)?;
        let raw = self.network.predict(&scaled)?;
        self.target_scaler.inverse_vector(&raw)
    }

    /// Loss and MAE against `y`, in the target's native units
    pub fn evaluate(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<RegressionMetrics> {
        let predictions = self.predict(x)?;
        RegressionMetrics::compute(y, &predictions)
    }

    fn check_features(&self, actual: usize) -> Result<()> {
        if actual != self.n_features() {
            return Err(ForecastError::FeatureMismatch {
                expected: self.n_features(),
                actual,
            });
        }
        Ok(())
    }
}

/// Result of [`ModelTrainer::fit`]
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub artifact: TrainedArtifact,
    /// Final losses and per-epoch history, in the target's native units
    pub report: FitReport,
    /// Held-out metrics of the finished artifact
    pub test_metrics: RegressionMetrics,
    pub train_samples: usize,
    pub test_samples: usize,
    pub elapsed_secs: f64,
}

/// Runs split, scaler fit and network fit for one dataset
#[derive(Debug, Clone)]
pub struct ModelTrainer {
    config: TrainingConfig,
    scaler_type: ScalerType,
}

impl ModelTrainer {
    pub fn new(config: TrainingConfig, scaler_type: ScalerType) -> Self {
        Self { config, scaler_type }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train a new artifact on `data`
    pub fn fit(&self, data: &ProcessedDataset) -> Result<TrainingOutcome> {
        let start = Instant::now();
        let config = &self.config;

        let split = config
            .split
            .split(&data.features, &data.target, config.test_split)?;

        // Scalers see only the training subset
        let mut feature_scaler = Scaler::new(self.scaler_type);
        feature_scaler.fit(&split.x_train)?;
        let mut target_scaler = Scaler::new(self.scaler_type);
        target_scaler.fit_vector(&split.y_train)?;

        let x_train = feature_scaler.transform(&split.x_train)?;
        let x_test = feature_scaler.transform(&split.x_test)?;
        let y_train = target_scaler.transform_vector(&split.y_train)?;
        let y_test = target_scaler.transform_vector(&split.y_test)?;

        let mut network = MLPRegressor::new(MLPConfig {
            hidden_layers: config.hidden_layers.clone(),
            activation: config.activation,
            learning_rate: config.learning_rate,
            random_state: config.random_seed,
        });
        let scaled_report = network.fit(
            &x_train,
            &y_train,
            &x_test,
            &y_test,
            config.epochs,
            config.batch_size,
        )?;

        let scale = target_scaler.scale_factor(0)?;
        let report = native_units(&scaled_report, scale);

        let artifact = TrainedArtifact {
            network,
            feature_scaler,
            target_scaler,
            feature_names: data.feature_names.clone(),
            target_name: data.target_name.clone(),
        };

        let test_metrics = artifact.evaluate(&split.x_test, &split.y_test)?;
        let elapsed_secs = start.elapsed().as_secs_f64();

        info!(
            train_samples = split.train_samples(),
            test_samples = split.test_samples(),
            epochs = config.epochs,
            training_loss = report.training_loss,
            loss = test_metrics.loss,
            mae = test_metrics.mae,
            elapsed_secs,
            "Model fitted"
        );

        Ok(TrainingOutcome {
            artifact,
            report,
            test_metrics,
            train_samples: split.train_samples(),
            test_samples: split.test_samples(),
            elapsed_secs,
        })
    }
}

fn native_units(report: &FitReport, scale: f64) -> FitReport {
    let convert = |loss: f64, mae: f64| RegressionMetrics { loss, mae }.rescaled(scale);

    let history = report
        .history
        .iter()
        .map(|m| {
            let train = convert(m.loss, m.mae);
            let val = convert(m.val_loss, m.val_mae);
            EpochMetrics {
                epoch: m.epoch,
                loss: train.loss,
                mae: train.mae,
                val_loss: val.loss,
                val_mae: val.mae,
            }
        })
        .collect();
    let train = convert(report.training_loss, report.training_mae);
    let val = convert(report.validation_loss, report.validation_mae);

    FitReport {
        training_loss: train.loss,
        training_mae: train.mae,
        validation_loss: val.loss,
        validation_mae: val.mae,
        history,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(n: usize) -> ProcessedDataset {
        let features = Array2::from_shape_fn((n, 2), |(i, j)| (i as f64) * (j as f64 + 1.0));
        let target = features.column(0).mapv(|v| 1000.0 + 50.0 * v);
        ProcessedDataset {
            features,
            target,
            feature_names: vec!["a".into(), "b".into()],
            target_name: "y".into(),
            dropped_rows: 0,
        }
    }

    #[test]
    fn test_fit_partitions_all_rows() {
        let trainer = ModelTrainer::new(TrainingConfig::new().with_epochs(3), ScalerType::Standard);
        let outcome = trainer.fit(&dataset(50)).unwrap();

        assert_eq!(outcome.train_samples, 40);
        assert_eq!(outcome.test_samples, 10);
        assert_eq!(outcome.report.history.len(), 3);
        assert_eq!(outcome.artifact.n_features(), 2);
        assert!(outcome.test_metrics.loss.is_finite());
    }

    #[test]
    fn test_reported_metrics_are_native_units() {
        let trainer = ModelTrainer::new(TrainingConfig::new().with_epochs(2), ScalerType::Standard);
        let data = dataset(40);
        let outcome = trainer.fit(&data).unwrap();

        // Final-epoch validation metrics come from the same network as the artifact
        let rel = (outcome.report.validation_loss - outcome.test_metrics.loss).abs()
            / outcome.test_metrics.loss.max(1e-12);
        assert!(rel < 1e-6, "{} vs {}", outcome.report.validation_loss, outcome.test_metrics.loss);

        let prediction = outcome.artifact.predict_one(&[1.0, 2.0]).unwrap();
        assert!(prediction.is_finite());
    }

    #[test]
    fn test_training_mae_matches_artifact_on_training_rows() {
        let trainer = ModelTrainer::new(TrainingConfig::new().with_epochs(2), ScalerType::Standard);
        let data = dataset(40);
        let outcome = trainer.fit(&data).unwrap();

        let n_train = outcome.train_samples;
        let x_train = data.features.slice(ndarray::s![..n_train, ..]).to_owned();
        let y_train = data.target.slice(ndarray::s![..n_train]).to_owned();
        let metrics = outcome.artifact.evaluate(&x_train, &y_train).unwrap();

        let rel = (outcome.report.training_mae - metrics.mae).abs() / metrics.mae.max(1e-12);
        assert!(rel < 1e-6, "{} vs {}", outcome.report.training_mae, metrics.mae);
        assert_eq!(
            outcome.report.history.last().unwrap().mae,
            outcome.report.training_mae
        );
    }

    #[test]
    fn test_activation_is_configurable() {
        use crate::training::Activation;

        let data = dataset(30);
        for activation in [Activation::ReLU, Activation::Tanh, Activation::Linear] {
            let config = TrainingConfig::new().with_epochs(2).with_activation(activation);
            let outcome = ModelTrainer::new(config, ScalerType::Standard).fit(&data).unwrap();
            assert_eq!(outcome.artifact.network().config().activation, activation);
            assert!(outcome.test_metrics.loss.is_finite());
        }

        let relu = ModelTrainer::new(TrainingConfig::new().with_epochs(2), ScalerType::Standard)
            .fit(&data)
            .unwrap();
        let tanh = ModelTrainer::new(
            TrainingConfig::new().with_epochs(2).with_activation(Activation::Tanh),
            ScalerType::Standard,
        )
        .fit(&data)
        .unwrap();
        assert_ne!(
            relu.artifact.predict_one(&[3.0, 6.0]).unwrap(),
            tanh.artifact.predict_one(&[3.0, 6.0]).unwrap()
        );
    }

    #[test]
    fn test_artifact_checks_feature_count() {
        let trainer = ModelTrainer::new(TrainingConfig::new().with_epochs(1), ScalerType::Standard);
        let artifact = trainer.fit(&dataset(20)).unwrap().artifact;

        let err = artifact.predict_one(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, ForecastError::FeatureMismatch { expected: 2, actual: 3 }));
        assert!(artifact.evaluate(&Array2::zeros((3, 1)), &Array1::zeros(3)).is_err());
    }

    #[test]
    fn test_same_seed_same_artifact() {
        let trainer = ModelTrainer::new(TrainingConfig::new().with_epochs(2), ScalerType::Standard);
        let data = dataset(30);
        let a = trainer.fit(&data).unwrap();
        let b = trainer.fit(&data).unwrap();
        assert_eq!(
            a.artifact.predict_one(&[3.0, 6.0]).unwrap(),
            b.artifact.predict_one(&[3.0, 6.0]).unwrap()
        );
    }
}
