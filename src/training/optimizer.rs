//! Adam optimizer over the network's weight and bias tensors

use crate::error::{ForecastError, Result};
use ndarray::{Array, Array1, Array2, Dimension, Zip};

/// Adam with bias-corrected step size.
///
/// Holds first and second moment estimates for every weight matrix and bias
/// vector of one network. Moment shapes are fixed at construction.
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    beta1_t: f64,
    beta2_t: f64,
    m_weights: Vec<Array2<f64>>,
    v_weights: Vec<Array2<f64>>,
    m_biases: Vec<Array1<f64>>,
    v_biases: Vec<Array1<f64>>,
}

impl Adam {
    /// Create an optimizer with Keras-style defaults for the given parameter shapes.
    pub fn new(learning_rate: f64, weights: &[Array2<f64>], biases: &[Array1<f64>]) -> Self {
        Self::with_hyperparameters(learning_rate, 0.9, 0.999, 1e-7, weights, biases)
    }

    pub fn with_hyperparameters(
        learning_rate: f64,
        beta1: f64,
        beta2: f64,
        epsilon: f64,
        weights: &[Array2<f64>],
        biases: &[Array1<f64>],
    ) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            beta1_t: 1.0,
            beta2_t: 1.0,
            m_weights: weights.iter().map(|w| Array2::zeros(w.raw_dim())).collect(),
            v_weights: weights.iter().map(|w| Array2::zeros(w.raw_dim())).collect(),
            m_biases: biases.iter().map(|b| Array1::zeros(b.raw_dim())).collect(),
            v_biases: biases.iter().map(|b| Array1::zeros(b.raw_dim())).collect(),
        }
    }

    /// Apply one update step. `gradients[i]` pairs with `weights[i]` / `biases[i]`.
    pub fn step(
        &mut self,
        weights: &mut [Array2<f64>],
        biases: &mut [Array1<f64>],
        gradients: &[(Array2<f64>, Array1<f64>)],
    ) -> Result<()> {
        if gradients.len() != weights.len()
            || weights.len() != self.m_weights.len()
            || biases.len() != self.m_biases.len()
        {
            return Err(ForecastError::ComputationError(format!(
                "Adam expected {} layers, got {} gradients",
                self.m_weights.len(),
                gradients.len()
            )));
        }

        self.beta1_t *= self.beta1;
        self.beta2_t *= self.beta2;
        let step_size = self.learning_rate * (1.0 - self.beta2_t).sqrt() / (1.0 - self.beta1_t);
        let moments = Moments {
            beta1: self.beta1,
            beta2: self.beta2,
            epsilon: self.epsilon,
            step_size,
        };

        for (i, (grad_w, grad_b)) in gradients.iter().enumerate() {
            moments.update(&mut weights[i], grad_w, &mut self.m_weights[i], &mut self.v_weights[i])?;
            moments.update(&mut biases[i], grad_b, &mut self.m_biases[i], &mut self.v_biases[i])?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy)]
struct Moments {
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    step_size: f64,
}

impl Moments {
    fn update<D: Dimension>(
        &self,
        param: &mut Array<f64, D>,
        grad: &Array<f64, D>,
        m: &mut Array<f64, D>,
        v: &mut Array<f64, D>,
    ) -> Result<()> {
        if param.shape() != grad.shape() || param.shape() != m.shape() {
            return Err(ForecastError::ComputationError(format!(
                "Gradient shape {:?} does not match parameter shape {:?}",
                grad.shape(),
                param.shape()
            )));
        }

        let Moments { beta1: b1, beta2: b2, epsilon: eps, step_size } = *self;
        Zip::from(param).and(grad).and(m).and(v).for_each(|p, &g, m, v| {
            *m = b1 * *m + (1.0 - b1) * g;
            *v = b2 * *v + (1.0 - b2) * g * g;
            *p -= step_size * *m / (v.sqrt() + eps);
        });
        Ok(())
    }
}
