//! Data preprocessing module
//!
//! Provides the tabular contract between raw CSV uploads and the model:
//! - Explicit schema resolution (date columns dropped, one target, ordered features)
//! - Strict numeric validation with forward-filled gaps
//! - Feature and target scaling fitted once at training time

mod config;
mod pipeline;
mod scaler;
mod schema;

pub use config::{PreprocessingConfig, DEFAULT_MIN_ROWS};
pub use pipeline::{ProcessedDataset, TabularPreprocessor};
pub use scaler::{Scaler, ScalerType};
pub use schema::{ColumnRole, ColumnSpec, DatasetSchema};
