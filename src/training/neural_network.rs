//! Neural Network (Multi-Layer Perceptron) regressor
//!
//! Feedforward network with ReLU hidden layers and a single linear output,
//! trained on mean-squared-error with Adam and shuffled mini-batches.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::optimizer::Adam;
use super::RegressionMetrics;
use crate::error::{ForecastError, Result};

/// Activation function for hidden layers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Activation {
    /// Rectified Linear Unit
    ReLU,
    /// Hyperbolic tangent
    Tanh,
    /// Linear (identity)
    Linear,
}

impl Default for Activation {
    fn default() -> Self {
        Self::ReLU
    }
}

/// Network architecture and optimizer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MLPConfig {
    /// Hidden layer sizes
    pub hidden_layers: Vec<usize>,
    /// Activation function for hidden layers
    pub activation: Activation,
    /// Adam learning rate
    pub learning_rate: f64,
    /// Seed for weight initialization and batch shuffling
    pub random_state: Option<u64>,
}

impl Default for MLPConfig {
    fn default() -> Self {
        Self {
            hidden_layers: vec![64, 32],
            activation: Activation::ReLU,
            learning_rate: 0.001,
            random_state: Some(42),
        }
    }
}

/// Losses recorded at the end of one epoch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch: usize,
    /// MSE over the full training subset
    pub loss: f64,
    /// MAE over the full training subset
    pub mae: f64,
    pub val_loss: f64,
    pub val_mae: f64,
}

/// Outcome of [`MLPRegressor::fit`]: final-epoch losses plus the per-epoch history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitReport {
    pub training_loss: f64,
    pub training_mae: f64,
    pub validation_loss: f64,
    pub validation_mae: f64,
    pub history: Vec<EpochMetrics>,
}

/// Multi-Layer Perceptron Regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MLPRegressor {
    config: MLPConfig,
    weights: Vec<Array2<f64>>,
    biases: Vec<Array1<f64>>,
    n_features: usize,
    is_fitted: bool,
}

impl MLPRegressor {
    pub fn new(config: MLPConfig) -> Self {
        Self {
            config,
            weights: Vec::new(),
            biases: Vec::new(),
            n_features: 0,
            is_fitted: false,
        }
    }

    pub fn config(&self) -> &MLPConfig {
        &self.config
    }

    /// Input width captured at fit time; zero before fitting
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Train for exactly `epochs` passes over `(x_train, y_train)`.
    ///
    /// Weights are re-initialized on every call. After each epoch the full
    /// training and validation subsets are scored and recorded in the history.
    pub fn fit(
        &mut self,
        x_train: &Array2<f64>,
        y_train: &Array1<f64>,
        x_val: &Array2<f64>,
        y_val: &Array1<f64>,
        epochs: usize,
        batch_size: usize,
    ) -> Result<FitReport> {
        let n_samples = x_train.nrows();
        if n_samples == 0 || x_val.nrows() == 0 {
            return Err(ForecastError::TrainingError(
                "Training and validation subsets must both be non-empty".to_string(),
            ));
        }
        if y_train.len() != n_samples || y_val.len() != x_val.nrows() {
            return Err(ForecastError::ValidationError(
                "Feature and target row counts differ".to_string(),
            ));
        }
        if x_val.ncols() != x_train.ncols() {
            return Err(ForecastError::FeatureMismatch {
                expected: x_train.ncols(),
                actual: x_val.ncols(),
            });
        }
        if epochs == 0 || batch_size == 0 {
            return Err(ForecastError::invalid_parameter(
                "epochs/batch_size",
                format!("{}/{}", epochs, batch_size),
                "must both be at least 1",
            ));
        }

        self.n_features = x_train.ncols();
        self.is_fitted = false;

        let mut rng = match self.config.random_state {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };
        self.initialize_weights(&mut rng)?;

        let mut optimizer = Adam::new(self.config.learning_rate, &self.weights, &self.biases);
        let mut history = Vec::with_capacity(epochs);
        let mut indices: Vec<usize> = (0..n_samples).collect();

        for epoch in 1..=epochs {
            indices.shuffle(&mut rng);

            for batch_indices in indices.chunks(batch_size) {
                let x_batch = x_train.select(Axis(0), batch_indices);
                let y_batch = y_train.select(Axis(0), batch_indices);

                let (activations, z_values) = self.forward(&x_batch);
                let gradients = self.backward(&y_batch, &activations, &z_values);
                optimizer.step(&mut self.weights, &mut self.biases, &gradients)?;
            }

            let train_metrics = RegressionMetrics::compute(y_train, &self.output(x_train))?;
            let val_metrics = RegressionMetrics::compute(y_val, &self.output(x_val))?;

            if !train_metrics.loss.is_finite() || !val_metrics.loss.is_finite() {
                return Err(ForecastError::TrainingError(format!(
                    "Loss diverged at epoch {} (training {}, validation {})",
                    epoch, train_metrics.loss, val_metrics.loss
                )));
            }

            debug!(
                epoch,
                loss = train_metrics.loss,
                val_loss = val_metrics.loss,
                val_mae = val_metrics.mae,
                "Epoch complete"
            );

            history.push(EpochMetrics {
                epoch,
                loss: train_metrics.loss,
                mae: train_metrics.mae,
                val_loss: val_metrics.loss,
                val_mae: val_metrics.mae,
            });
        }

        self.is_fitted = true;

        let last = history.last().copied().ok_or_else(|| {
            ForecastError::TrainingError("No epochs were run".to_string())
        })?;

        Ok(FitReport {
            training_loss: last.loss,
            training_mae: last.mae,
            validation_loss: last.val_loss,
            validation_mae: last.val_mae,
            history,
        })
    }

    /// Predict every row of `x`
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.check_input(x.ncols())?;
        Ok(self.output(x))
    }

    /// Predict a single feature vector
    pub fn predict_one(&self, features: &[f64]) -> Result<f64> {
        self.check_input(features.len())?;
        let x = ArrayView1::from(features).insert_axis(Axis(0)).to_owned();
        Ok(self.output(&x)[0])
    }

    /// MSE and MAE of predictions on `x` against `y`
    pub fn evaluate(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<RegressionMetrics> {
        let predictions = self.predict(x)?;
        RegressionMetrics::compute(y, &predictions)
    }

    fn check_input(&self, n_features: usize) -> Result<()> {
        if !self.is_fitted {
            return Err(ForecastError::ModelNotFitted);
        }
        if n_features != self.n_features {
            return Err(ForecastError::FeatureMismatch {
                expected: self.n_features,
                actual: n_features,
            });
        }
        Ok(())
    }

    fn output(&self, x: &Array2<f64>) -> Array1<f64> {
        let (mut activations, _) = self.forward(x);
        match activations.pop() {
            Some(out) => out.column(0).to_owned(),
            None => Array1::zeros(x.nrows()),
        }
    }

    fn initialize_weights(&mut self, rng: &mut Xoshiro256PlusPlus) -> Result<()> {
        self.weights.clear();
        self.biases.clear();

        let mut layer_sizes = vec![self.n_features];
        layer_sizes.extend(&self.config.hidden_layers);
        layer_sizes.push(1);

        for pair in layer_sizes.windows(2) {
            let (n_in, n_out) = (pair[0], pair[1]);

            // Glorot uniform
            let limit = (6.0 / (n_in + n_out) as f64).sqrt();
            let weights: Vec<f64> = (0..n_in * n_out)
                .map(|_| rng.gen_range(-limit..=limit))
                .collect();

            self.weights.push(Array2::from_shape_vec((n_in, n_out), weights)?);
            self.biases.push(Array1::zeros(n_out));
        }
        Ok(())
    }

    fn forward(&self, x: &Array2<f64>) -> (Vec<Array2<f64>>, Vec<Array2<f64>>) {
        let n_layers = self.weights.len();
        let mut activations = vec![x.clone()];
        let mut z_values = Vec::with_capacity(n_layers);

        for (i, (w, b)) in self.weights.iter().zip(self.biases.iter()).enumerate() {
            let z = activations[i].dot(w) + b;
            let a = if i + 1 < n_layers {
                activate(&z, self.config.activation)
            } else {
                z.clone()
            };
            z_values.push(z);
            activations.push(a);
        }

        (activations, z_values)
    }

    fn backward(
        &self,
        y: &Array1<f64>,
        activations: &[Array2<f64>],
        z_values: &[Array2<f64>],
    ) -> Vec<(Array2<f64>, Array1<f64>)> {
        let n = y.len() as f64;
        let mut gradients = Vec::with_capacity(self.weights.len());

        // d(MSE)/d(output)
        let y_2d = y.view().insert_axis(Axis(1));
        let output = &activations[activations.len() - 1];
        let mut delta = (output - &y_2d) * (2.0 / n);

        for i in (0..self.weights.len()).rev() {
            let grad_w = activations[i].t().dot(&delta);
            let grad_b = delta.sum_axis(Axis(0));
            gradients.push((grad_w, grad_b));

            if i > 0 {
                delta = delta.dot(&self.weights[i].t())
                    * activate_derivative(&z_values[i - 1], self.config.activation);
            }
        }

        gradients.reverse();
        gradients
    }
}

fn activate(z: &Array2<f64>, activation: Activation) -> Array2<f64> {
    match activation {
        Activation::ReLU => z.mapv(|v| v.max(0.0)),
        Activation::Tanh => z.mapv(f64::tanh),
        Activation::Linear => z.clone(),
    }
}

fn activate_derivative(z: &Array2<f64>, activation: Activation) -> Array2<f64> {
    match activation {
        Activation::ReLU => z.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 }),
        Activation::Tanh => z.mapv(|v| 1.0 - v.tanh().powi(2)),
        Activation::Linear => Array2::ones(z.raw_dim()),
    }
}
