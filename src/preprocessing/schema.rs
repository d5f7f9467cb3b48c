//! Explicit column roles for an uploaded table
//!
//! Every column is assigned exactly one role before any value is read. Date
//! columns are dropped, one column becomes the target, and everything else is
//! a feature in header order.

use crate::error::{ForecastError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::PreprocessingConfig;

/// Role a column plays in training
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnRole {
    Date,
    Feature,
    Target,
}

/// A named column and its role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub role: ColumnRole,
}

/// Validated schema of a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSchema {
    columns: Vec<ColumnSpec>,
}

impl DatasetSchema {
    /// Assign roles to the columns of `df`.
    ///
    /// The target is `config.target_column` when set, otherwise the last
    /// non-date column. Fails when fewer than one feature would remain or the
    /// configured target does not name a usable column.
    pub fn infer(df: &DataFrame, config: &PreprocessingConfig) -> Result<Self> {
        let mut columns: Vec<ColumnSpec> = df
            .get_columns()
            .iter()
            .map(|col| {
                let name = col.name().to_string();
                let role = if is_temporal(col.dtype()) || config.is_declared_date(&name) {
                    ColumnRole::Date
                } else {
                    ColumnRole::Feature
                };
                ColumnSpec { name, role }
            })
            .collect();

        let usable = columns.iter().filter(|c| c.role != ColumnRole::Date).count();
        if usable < 2 {
            return Err(ForecastError::ValidationError(format!(
                "Need at least 2 non-date columns (features + target), found {}",
                usable
            )));
        }

        let target_idx = match &config.target_column {
            Some(target) => {
                let idx = columns
                    .iter()
                    .position(|c| &c.name == target)
                    .ok_or_else(|| {
                        ForecastError::ValidationError(format!("Target column not found: {}", target))
                    })?;
                if columns[idx].role == ColumnRole::Date {
                    return Err(ForecastError::ValidationError(format!(
                        "Target column '{}' is a date column",
                        target
                    )));
                }
                idx
            }
            None => columns
                .iter()
                .rposition(|c| c.role != ColumnRole::Date)
                .ok_or_else(|| ForecastError::ValidationError("No target column available".to_string()))?,
        };
        columns[target_idx].role = ColumnRole::Target;

        Ok(Self { columns })
    }

    /// All columns in header order
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Feature column names in header order
    pub fn feature_names(&self) -> Vec<String> {
        self.names_with_role(ColumnRole::Feature)
    }

    /// Date column names that will be dropped
    pub fn date_columns(&self) -> Vec<String> {
        self.names_with_role(ColumnRole::Date)
    }

    pub fn target_name(&self) -> &str {
        self.columns
            .iter()
            .find(|c| c.role == ColumnRole::Target)
            .map(|c| c.name.as_str())
            .unwrap_or_default()
    }

    pub fn n_features(&self) -> usize {
        self.columns.iter().filter(|c| c.role == ColumnRole::Feature).count()
    }

    fn names_with_role(&self, role: ColumnRole) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.role == role)
            .map(|c| c.name.clone())
            .collect()
    }
}

fn is_temporal(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Date | DataType::Datetime(_, _))
}
