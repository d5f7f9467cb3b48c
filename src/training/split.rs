//! Train/held-out partitioning

use crate::error::{ForecastError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Policy for choosing held-out rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitStrategy {
    /// Chronological: the last rows are held out, preserving time order
    Sequential,
    /// Rows shuffled with a seeded RNG before partitioning
    Shuffled { seed: u64 },
}

impl Default for SplitStrategy {
    fn default() -> Self {
        SplitStrategy::Sequential
    }
}

/// Result of partitioning a dataset
#[derive(Debug, Clone)]
pub struct DataSplit {
    pub x_train: Array2<f64>,
    pub y_train: Array1<f64>,
    pub x_test: Array2<f64>,
    pub y_test: Array1<f64>,
}

impl DataSplit {
    pub fn train_samples(&self) -> usize {
        self.x_train.nrows()
    }

    pub fn test_samples(&self) -> usize {
        self.x_test.nrows()
    }
}

impl SplitStrategy {
    /// Number of held-out rows: `round(n * test_split)`.
    ///
    /// Fails unless both partitions end up non-empty.
    pub fn held_out_size(n_samples: usize, test_split: f64) -> Result<usize> {
        if !(test_split > 0.0 && test_split < 1.0) {
            return Err(ForecastError::invalid_parameter(
                "test_split",
                test_split,
                "must be strictly between 0 and 1",
            ));
        }

        let n_test = (n_samples as f64 * test_split).round() as usize;
        if n_test == 0 || n_test >= n_samples {
            return Err(ForecastError::ValidationError(format!(
                "test_split {} on {} rows leaves an empty partition ({} train, {} held out)",
                test_split,
                n_samples,
                n_samples.saturating_sub(n_test),
                n_test
            )));
        }
        Ok(n_test)
    }

    /// Partition `(x, y)` into training and held-out subsets
    pub fn split(&self, x: &Array2<f64>, y: &Array1<f64>, test_split: f64) -> Result<DataSplit> {
        let n = x.nrows();
        if y.len() != n {
            return Err(ForecastError::ValidationError(format!(
                "Feature rows ({}) and target length ({}) differ",
                n,
                y.len()
            )));
        }

        let n_test = Self::held_out_size(n, test_split)?;
        let n_train = n - n_test;

        let mut indices: Vec<usize> = (0..n).collect();
        if let SplitStrategy::Shuffled { seed } = self {
            let mut rng = ChaCha8Rng::seed_from_u64(*seed);
            indices.shuffle(&mut rng);
        }

        let (train_idx, test_idx) = indices.split_at(n_train);

        Ok(DataSplit {
            x_train: x.select(Axis(0), train_idx),
            y_train: y.select(Axis(0), train_idx),
            x_test: x.select(Axis(0), test_idx),
            y_test: y.select(Axis(0), test_idx),
        })
    }
}
