//! Request handlers

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Multipart, Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::lifecycle::{
    EvaluationOutcome, HealthStatus, PredictionOutcome, TrainParams, TrainSummary,
};
use crate::registry::ModelMetadata;

use super::error::{Result, ServerError};
use super::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TrainQuery {
    pub epochs: Option<usize>,
    pub batch_size: Option<usize>,
    pub test_split: Option<f64>,
}

impl From<TrainQuery> for TrainParams {
    fn from(q: TrainQuery) -> Self {
        TrainParams {
            epochs: q.epochs,
            batch_size: q.batch_size,
            test_split: q.test_split,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictRequest {
    pub features: Vec<f64>,
}

/// Pull the `file` part out of a multipart upload, requiring a `.csv` name
async fn read_csv_upload(mut multipart: Multipart) -> Result<Vec<u8>> {
    while let Some(field) = multipart.next_field().await? {
        let is_file = field.name() == Some("file") || field.file_name().is_some();
        if !is_file {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        if !file_name.to_ascii_lowercase().ends_with(".csv") {
            return Err(ServerError::BadRequest("File must be a CSV".to_string()));
        }

        let data = field.bytes().await?;
        info!(file = %file_name, bytes = data.len(), "Received upload");
        return Ok(data.to_vec());
    }

    Err(ServerError::BadRequest(
        "No file uploaded. Send the CSV in a multipart field named 'file'".to_string(),
    ))
}

pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "name": "stock-ann",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Feed-forward regression on tabular OHLCV data",
        "endpoints": {
            "GET /health": "Service and model status",
            "POST /train": "Train on a CSV upload (query: epochs, batch_size, test_split)",
            "POST /predict": "Predict from {\"features\": [...]}",
            "POST /evaluate": "Score the current model on a CSV upload",
            "GET /model/info": "Metadata of the current model",
        },
    }))
}

/// Model status plus how long this server has been up
#[derive(Debug, Serialize)]
pub struct ServiceHealth {
    #[serde(flatten)]
    pub model: HealthStatus,
    pub uptime_secs: i64,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ServiceHealth> {
    Json(ServiceHealth {
        model: state.lifecycle.health(),
        uptime_secs: state.uptime_secs(),
    })
}

pub async fn train(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<TrainQuery>, QueryRejection>,
    multipart: Multipart,
) -> Result<Json<TrainSummary>> {
    let Query(query) = query?;
    let params = TrainParams::from(query);
    // Reject bad hyperparameters before reading the body
    state.lifecycle.resolve_params(params)?;

    let data = read_csv_upload(multipart).await?;
    let lifecycle = Arc::clone(&state.lifecycle);
    let summary = tokio::task::spawn_blocking(move || lifecycle.train(&data, params)).await??;

    Ok(Json(summary))
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    request: std::result::Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictionOutcome>> {
    let Json(request) = request?;
    let lifecycle = Arc::clone(&state.lifecycle);
    let outcome =
        tokio::task::spawn_blocking(move || lifecycle.predict(&request.features)).await??;
    Ok(Json(outcome))
}

pub async fn evaluate(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<EvaluationOutcome>> {
    // Fail fast with 404 before accepting the upload
    state.lifecycle.registry().get()?;

    let data = read_csv_upload(multipart).await?;
    let lifecycle = Arc::clone(&state.lifecycle);
    let outcome = tokio::task::spawn_blocking(move || lifecycle.evaluate(&data)).await??;
    Ok(Json(outcome))
}

pub async fn model_info(State(state): State<Arc<AppState>>) -> Result<Json<ModelMetadata>> {
    Ok(Json(state.lifecycle.info()?))
}
