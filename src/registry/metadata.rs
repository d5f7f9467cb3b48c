//! Model metadata and identifiers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Descriptive record bound 1:1 to a trained artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_id: String,
    pub created_at: DateTime<Utc>,
    /// Length of the feature vector the artifact accepts
    pub input_features: usize,
    pub feature_names: Vec<String>,
    pub target_name: String,
    pub training_samples: usize,
    pub test_samples: usize,
    pub epochs: usize,
    pub batch_size: usize,
    pub test_split: f64,
    /// Final-epoch loss over the training subset
    pub training_loss: f64,
    /// Final-epoch mean absolute error over the training subset
    #[serde(default)]
    pub training_mae: f64,
    /// Held-out loss (MSE)
    pub loss: f64,
    /// Held-out mean absolute error
    pub mae: f64,
}

static SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Builds `<prefix>_<YYYYmmdd>_<HHMMSS>_<seq>` identifiers.
///
/// The sequence is shared by every generator in the process, so two models
/// created within the same second still get distinct identifiers.
#[derive(Debug, Clone)]
pub struct ModelIdGenerator {
    prefix: String,
}

impl Default for ModelIdGenerator {
    fn default() -> Self {
        Self::new("model")
    }
}

impl ModelIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Identifier for a model created at `created_at`
    pub fn next_id(&self, created_at: &DateTime<Utc>) -> String {
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        format!(
            "{}_{}_{}",
            self.prefix,
            created_at.format("%Y%m%d_%H%M%S"),
            seq
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    #[test]
    fn test_id_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let id = ModelIdGenerator::default().next_id(&at);
        assert!(id.starts_with("model_20240309_140507_"), "{}", id);
    }

    #[test]
    fn test_ids_unique_within_same_second() {
        let at = Utc::now();
        let generator = ModelIdGenerator::default();
        let ids: HashSet<String> = (0..100).map(|_| generator.next_id(&at)).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_metadata_serializes() {
        let meta = ModelMetadata {
            model_id: "model_x".into(),
            created_at: Utc::now(),
            input_features: 4,
            feature_names: vec!["Open".into(), "High".into(), "Low".into(), "Close".into()],
            target_name: "Volume".into(),
            training_samples: 8,
            test_samples: 2,
            epochs: 50,
            batch_size: 32,
            test_split: 0.2,
            training_loss: 1.0,
            training_mae: 0.8,
            loss: 2.0,
            mae: 1.0,
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["input_features"], 4);
        assert_eq!(json["target_name"], "Volume");

        let back: ModelMetadata = serde_json::from_value(json).unwrap();
        assert_eq!(back, meta);
    }
}
