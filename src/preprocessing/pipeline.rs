//! Tabular preprocessing pipeline
//!
//! Turns a raw CSV table into a dense feature matrix and a target vector:
//! 1. Parse with the polars CSV reader (header required, dates parsed)
//! 2. Resolve column roles via [`DatasetSchema`]
//! 3. Cast every feature and the target to f64, rejecting non-numeric cells
//! 4. Forward-fill gaps and drop rows that cannot be filled
//! 5. Enforce finiteness and the minimum row count

use crate::error::{ForecastError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

use super::{DatasetSchema, PreprocessingConfig};

/// Feature matrix and target vector ready for training or scoring
#[derive(Debug, Clone)]
pub struct ProcessedDataset {
    pub features: Array2<f64>,
    pub target: Array1<f64>,
    pub feature_names: Vec<String>,
    pub target_name: String,
    /// Rows removed because a gap could not be forward-filled
    pub dropped_rows: usize,
}

impl ProcessedDataset {
    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Shape of the cleaned table: rows x (features + target)
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows(), self.n_features() + 1)
    }
}

/// Stateless CSV-to-matrix preprocessor
#[derive(Debug, Clone, Default)]
pub struct TabularPreprocessor {
    config: PreprocessingConfig,
}

impl TabularPreprocessor {
    pub fn new(config: PreprocessingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreprocessingConfig {
        &self.config
    }

    /// Parse CSV bytes into a DataFrame
    pub fn read_csv(&self, data: &[u8]) -> Result<DataFrame> {
        if data.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(ForecastError::DataError("The uploaded file is empty".to_string()));
        }

        let parse_opts = CsvParseOptions::default().with_try_parse_dates(true);

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(Cursor::new(data))
            .finish()
            .map_err(|e| ForecastError::DataError(format!("Could not parse CSV: {}", e)))?;

        debug!(rows = df.height(), columns = df.width(), "Parsed CSV");
        Ok(df)
    }

    /// Read and parse a CSV file from disk
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            ForecastError::DataError(format!("Could not read {}: {}", path.display(), e))
        })?;
        self.read_csv(&data)
    }

    /// Resolve column roles for `df`
    pub fn infer_schema(&self, df: &DataFrame) -> Result<DatasetSchema> {
        DatasetSchema::infer(df, &self.config)
    }

    /// Process a training table, enforcing the configured minimum row count
    pub fn process(&self, df: &DataFrame) -> Result<ProcessedDataset> {
        self.process_with_min_rows(df, self.config.min_rows)
    }

    /// Process a table for scoring; any non-empty table is accepted
    pub fn process_for_evaluation(&self, df: &DataFrame) -> Result<ProcessedDataset> {
        self.process_with_min_rows(df, 1)
    }

    /// Parse and process CSV bytes with training rules
    pub fn process_csv(&self, data: &[u8]) -> Result<ProcessedDataset> {
        let df = self.read_csv(data)?;
        self.process(&df)
    }

    fn process_with_min_rows(&self, df: &DataFrame, min_rows: usize) -> Result<ProcessedDataset> {
        let schema = self.infer_schema(df)?;
        let feature_names = schema.feature_names();
        let target_name = schema.target_name().to_string();

        let mut columns: Vec<Vec<Option<f64>>> = feature_names
            .iter()
            .chain(std::iter::once(&target_name))
            .map(|name| numeric_column(df, name))
            .collect::<Result<_>>()?;

        for values in columns.iter_mut() {
            forward_fill(values);
        }

        let n_total = df.height();
        let keep: Vec<usize> = (0..n_total)
            .filter(|&row| columns.iter().all(|col| col[row].is_some()))
            .collect();
        let dropped_rows = n_total - keep.len();

        let dense: Vec<Vec<f64>> = columns
            .iter()
            .zip(feature_names.iter().chain(std::iter::once(&target_name)))
            .map(|(col, name)| {
                let values: Vec<f64> = keep.iter().filter_map(|&row| col[row]).collect();
                if values.iter().any(|v| !v.is_finite()) {
                    return Err(ForecastError::ValidationError(format!(
                        "Column '{}' contains non-finite values (NaN or Inf)",
                        name
                    )));
                }
                Ok(values)
            })
            .collect::<Result<_>>()?;

        let n_rows = keep.len();
        if n_rows < min_rows.max(1) {
            return Err(ForecastError::ValidationError(format!(
                "Need at least {} rows of data, got {} after cleaning",
                min_rows.max(1),
                n_rows
            )));
        }

        let n_features = feature_names.len();
        let features = Array2::from_shape_fn((n_rows, n_features), |(r, c)| dense[c][r]);
        let target = Array1::from_vec(dense[n_features].clone());

        info!(
            rows = n_rows,
            features = n_features,
            dropped_rows,
            target = %target_name,
            dropped_columns = ?schema.date_columns(),
            "Dataset preprocessed"
        );

        Ok(ProcessedDataset {
            features,
            target,
            feature_names,
            target_name,
            dropped_rows,
        })
    }
}

/// Extract a column as optional f64 values, rejecting non-numeric cells
fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|_| ForecastError::ValidationError(format!("Column not found: {}", name)))?;

    let non_numeric =
        || ForecastError::ValidationError(format!("Column '{}' contains non-numeric values", name));

    // Text may still hold numbers; booleans and other types never count as numeric
    let dtype = column.dtype();
    if !(dtype.is_integer() || dtype.is_float() || matches!(dtype, DataType::String | DataType::Null)) {
        return Err(non_numeric());
    }

    let series = column
        .as_materialized_series()
        .strict_cast(&DataType::Float64)
        .map_err(|_| non_numeric())?;

    Ok(series.f64()?.into_iter().collect())
}

/// Replace each gap with the closest preceding value; leading gaps stay empty
fn forward_fill(values: &mut [Option<f64>]) {
    let mut last = None;
    for value in values.iter_mut() {
        match value {
            Some(v) => last = Some(*v),
            None => *value = last,
        }
    }
}
