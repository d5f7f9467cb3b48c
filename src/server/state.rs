//! Application state management

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::lifecycle::{LifecycleConfig, ModelLifecycle};

use super::ServerConfig;

/// Application state shared across handlers
pub struct AppState {
    pub config: ServerConfig,
    pub lifecycle: Arc<ModelLifecycle>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: ServerConfig, lifecycle: LifecycleConfig) -> Self {
        Self::with_lifecycle(config, Arc::new(ModelLifecycle::new(lifecycle)))
    }

    pub fn with_lifecycle(config: ServerConfig, lifecycle: Arc<ModelLifecycle>) -> Self {
        Self {
            config,
            lifecycle,
            started_at: Utc::now(),
        }
    }

    pub fn uptime_secs(&self) -> i64 {
        Utc::now().signed_duration_since(self.started_at).num_seconds()
    }
}
