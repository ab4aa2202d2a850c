//! # Certificates
//!
//! Dashboard operations. Verification here is unredacted; the public
//! projection lives in [`super::public`].
//!
//! Routes:
//! - POST /v1/certificates — issue
//! - GET  /v1/certificates/{id} — stored record
//! - GET  /v1/certificates/{id}/verify?at={RFC3339}
//! - POST /v1/certificates/{id}/revoke

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use rcert_cert::{
    Certificate, CertificateLocator, CertificateStore, CertificateType, RevocationOutcome,
    VerificationResult, WorkRepository,
};
use rcert_core::{CertificateId, Timestamp, WorkId};
use serde::{Deserialize, Serialize};

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
    pub work_id: WorkId,
    pub certificate_type: CertificateType,
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifyParams {
    /// Evaluation instant; defaults to now.
    pub at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RevokeRequest {
    /// Acting party, when the token does not bind one.
    pub actor: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeResponse {
    pub certificate_id: CertificateId,
    pub revoked_at: Timestamp,
    /// True when the certificate was already revoked; `revokedAt` is the
    /// original time.
    pub already_revoked: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/certificates", post(issue_certificate))
        .route("/v1/certificates/{id}", get(get_certificate))
        .route("/v1/certificates/{id}/verify", get(verify_certificate))
        .route("/v1/certificates/{id}/revoke", post(revoke_certificate))
}

fn parse_id(raw: &str) -> Result<CertificateId, AppError> {
    CertificateId::parse(raw).map_err(|_| AppError::BadRequest(format!("{raw:?} is not a certificate id")))
}

async fn issue_certificate(
    State(state): State<AppState>,
    body: Result<Json<IssueRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Certificate>), AppError> {
    let req = extract_json(body)?;
    let work = state
        .works
        .get(&req.work_id)?
        .ok_or_else(|| AppError::NotFound(format!("work {}", req.work_id)))?;
    let cert = state
        .issuer
        .issue(&work, req.certificate_type, &state.issuance)?;
    state.metrics.record_issued();
    Ok((StatusCode::CREATED, Json(cert)))
}

async fn get_certificate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Certificate>, AppError> {
    let id = parse_id(&id)?;
    state
        .certificates
        .get(&id)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("certificate {id}")))
}

async fn verify_certificate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<VerifyParams>,
) -> Result<Json<VerificationResult>, AppError> {
    let id = parse_id(&id)?;
    let at = match params.at.as_deref() {
        Some(raw) => Timestamp::parse_lenient(raw)?,
        None => Timestamp::now(),
    };
    let result = state.verifier.verify_at(&CertificateLocator::Id(id), at).await;
    state.metrics.record_verification(result.reason);
    Ok(Json(result))
}

async fn revoke_certificate(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<String>,
    body: Option<Json<RevokeRequest>>,
) -> Result<Json<RevokeResponse>, AppError> {
    let id = parse_id(&id)?;
    let req = body.map(|Json(r)| r).unwrap_or_default();
    let actor = caller.acting_as(req.actor.as_deref())?;
    let outcome = state.revoker.revoke(&id, &actor)?;
    if matches!(outcome, RevocationOutcome::Revoked { .. }) {
        state.metrics.record_revoked();
    }
    Ok(Json(RevokeResponse {
        certificate_id: id,
        revoked_at: outcome.revoked_at(),
        already_revoked: matches!(outcome, RevocationOutcome::AlreadyRevoked { .. }),
    }))
}
