//! Model registry
//!
//! Single-slot, process-lifetime store for the current trained artifact and
//! its metadata. Entries are immutable and shared through `Arc`; replacing the
//! slot swaps the pointer under a short write lock, so readers always see a
//! whole entry, old or new.

mod metadata;

pub use metadata::{ModelIdGenerator, ModelMetadata};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::error::{ForecastError, Result};
use crate::training::TrainedArtifact;

/// A trained artifact paired with its metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub artifact: TrainedArtifact,
    pub metadata: ModelMetadata,
}

impl RegistryEntry {
    /// Pair an artifact with its metadata, checking they describe the same model
    pub fn new(artifact: TrainedArtifact, metadata: ModelMetadata) -> Result<Self> {
        let entry = Self { artifact, metadata };
        entry.validate()?;
        Ok(entry)
    }

    pub fn model_id(&self) -> &str {
        &self.metadata.model_id
    }

    /// Export as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            ForecastError::DataError(format!("Failed to create {}: {}", path.display(), e))
        })?;

        serde_json::to_writer_pretty(BufWriter::new(file), self).map_err(|e| {
            ForecastError::SerializationError(format!("Failed to write model: {}", e))
        })?;

        info!(model_id = %self.metadata.model_id, path = %path.display(), "Model exported");
        Ok(())
    }

    /// Import an entry written by [`RegistryEntry::save`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ForecastError::DataError(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let entry: Self = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            ForecastError::SerializationError(format!("Failed to read model: {}", e))
        })?;
        entry.validate()?;
        Ok(entry)
    }

    fn validate(&self) -> Result<()> {
        let n_features = self.artifact.n_features();
        if self.metadata.input_features != n_features {
            return Err(ForecastError::ValidationError(format!(
                "Metadata declares {} input features but the artifact takes {}",
                self.metadata.input_features, n_features
            )));
        }
        if !self.artifact.network().is_fitted() {
            return Err(ForecastError::ModelNotFitted);
        }
        Ok(())
    }
}

/// Holder of the current model
#[derive(Debug, Default)]
pub struct ModelRegistry {
    current: RwLock<Option<Arc<RegistryEntry>>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `entry` as the current model, returning the one it replaced
    pub fn put(&self, entry: RegistryEntry) -> Option<Arc<RegistryEntry>> {
        let entry = Arc::new(entry);
        let model_id = entry.metadata.model_id.clone();

        let previous = self.current.write().replace(entry);

        info!(
            model_id = %model_id,
            replaced = previous.as_ref().map(|p| p.metadata.model_id.as_str()).unwrap_or("none"),
            "Registry updated"
        );
        previous
    }

    /// Snapshot of the current entry
    pub fn get(&self) -> Result<Arc<RegistryEntry>> {
        self.current.read().clone().ok_or(ForecastError::ModelNotLoaded)
    }

    pub fn current_id(&self) -> Result<String> {
        self.get().map(|entry| entry.metadata.model_id.clone())
    }

    pub fn is_loaded(&self) -> bool {
        self.current.read().is_some()
    }
}
