//! # Works
//!
//! Routes:
//! - POST /v1/works — register a work
//! - GET  /v1/works/{id} — work and its anchor record, if any

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use rcert_anchor::AnchorRecord;
use rcert_cert::{Work, WorkDraft, WorkRepository};
use rcert_core::{Timestamp, WorkId};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkResponse {
    pub work: Work,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<AnchorRecord>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/works", post(register_work))
        .route("/v1/works/{id}", get(get_work))
}

async fn register_work(
    State(state): State<AppState>,
    body: Result<Json<WorkDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Work>), AppError> {
    let draft = extract_json(body)?;
    let work = draft.into_work(Timestamp::now())?;
    state.works.register(work.clone())?;
    tracing::info!(work_id = %work.id, owner = %work.owner_id, "work registered");
    Ok((StatusCode::CREATED, Json(work)))
}

async fn get_work(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WorkResponse>, AppError> {
    let id = WorkId::parse(&id)?;
    let work = state
        .works
        .get(&id)?
        .ok_or_else(|| AppError::NotFound(format!("work {id}")))?;
    let anchor = state.works.anchor_for(&id)?;
    Ok(Json(WorkResponse { work, anchor }))
}
