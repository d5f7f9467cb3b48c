//! Preprocessing configuration

use serde::{Deserialize, Serialize};
use super::ScalerType;

/// Default minimum number of rows accepted for training
pub const DEFAULT_MIN_ROWS: usize = 10;

/// Configuration for the tabular preprocessor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessingConfig {
    /// Explicit target column. When unset, the last non-date column is the target.
    pub target_column: Option<String>,

    /// Columns always treated as dates and dropped, in addition to any column
    /// the CSV reader parses as a temporal type. Defaults to `Date`.
    pub date_columns: Vec<String>,

    /// Minimum number of rows after cleaning
    pub min_rows: usize,

    /// Scaler applied to features and target, fitted at training time
    pub scaler_type: ScalerType,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            target_column: None,
            date_columns: vec!["Date".to_string()],
            min_rows: DEFAULT_MIN_ROWS,
            scaler_type: ScalerType::Standard,
        }
    }
}

impl PreprocessingConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the target column
    pub fn with_target_column(mut self, column: impl Into<String>) -> Self {
        self.target_column = Some(column.into());
        self
    }

    /// Builder method to declare a date column by name
    pub fn with_date_column(mut self, column: impl Into<String>) -> Self {
        self.date_columns.push(column.into());
        self
    }

    /// Builder method to set the minimum row count
    pub fn with_min_rows(mut self, min_rows: usize) -> Self {
        self.min_rows = min_rows;
        self
    }

    /// Builder method to set scaler type
    pub fn with_scaler(mut self, scaler_type: ScalerType) -> Self {
        self.scaler_type = scaler_type;
        self
    }

    /// Whether `name` was declared as a date column (case-insensitive)
    pub fn is_declared_date(&self, name: &str) -> bool {
        self.date_columns.iter().any(|c| c.eq_ignore_ascii_case(name))
    }
}
