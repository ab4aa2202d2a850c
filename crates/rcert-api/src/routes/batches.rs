//! # Batch Verification
//!
//! Routes:
//! - POST /v1/batches — start; 202 with the batch id
//! - GET  /v1/batches/{id} — summary and items in input order
//! - GET  /v1/batches/{id}/export — CSV; 409 while items are pending
//! - POST /v1/batches/{id}/cancel — cooperative cancellation

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rcert_batch::{BatchEvent, BatchSnapshot, BatchState, BatchSummary};
use rcert_core::BatchId;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StartBatchRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartBatchResponse {
    pub batch_id: BatchId,
    pub state: BatchState,
    pub summary: BatchSummary,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/batches", post(start_batch))
        .route("/v1/batches/{id}", get(get_batch))
        .route("/v1/batches/{id}/export", get(export_batch))
        .route("/v1/batches/{id}/cancel", post(cancel_batch))
}

fn lookup(state: &AppState, raw: &str) -> Result<rcert_batch::BatchHandle, AppError> {
    let id = BatchId::parse(raw)
        .map_err(|_| AppError::BadRequest(format!("{raw:?} is not a batch id")))?;
    state
        .batch(&id)
        .ok_or_else(|| AppError::NotFound(format!("batch {id}")))
}

async fn start_batch(
    State(state): State<AppState>,
    body: Result<Json<StartBatchRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StartBatchResponse>), AppError> {
    let req = extract_json(body)?;
    let (handle, mut events) = state.orchestrator.start(req.ids)?;
    let batch_id = handle.id();
    let evicted = state.batches.insert(handle.clone());
    if evicted > 0 {
        tracing::debug!(batch_id = %batch_id, evicted, "evicted finished batches");
    }
    state.metrics.record_batch();

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                BatchEvent::ItemResolved { item, summary, .. } => tracing::debug!(
                    batch_id = %batch_id,
                    index = item.index,
                    status = %item.status,
                    pending = summary.pending,
                    "batch progress"
                ),
                BatchEvent::Finished { .. } => break,
            }
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(StartBatchResponse {
            batch_id,
            state: BatchState::Running,
            summary: handle.summary(),
        }),
    ))
}

async fn get_batch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BatchSnapshot>, AppError> {
    Ok(Json(lookup(&state, &id)?.snapshot()))
}

async fn export_batch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let report = lookup(&state, &id)?.export_report()?;
    let disposition = format!("attachment; filename=\"batch-{}.csv\"", report.batch_id);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report.to_csv(),
    )
        .into_response())
}

async fn cancel_batch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BatchSnapshot>, AppError> {
    let handle = lookup(&state, &id)?;
    handle.cancel();
    Ok(Json(handle.snapshot()))
}
