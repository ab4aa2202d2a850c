//! # Public Verification
//!
//! Unauthenticated. Responses are always redacted and carry
//! `Cache-Control`; for a given stored state and evaluation instant the
//! answer is the same, so a short TTL is safe.
//!
//! Routes:
//! - GET /v1/public/verify?id={certificateId} | ?hash={contentHash}
//! - GET /v1/public/key — signer key id and public key

use axum::extract::{Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rcert_cert::{
    normalize_content_hash, CertificateLocator, PublicVerification, ReasonCode,
    VerificationResult,
};
use rcert_core::{CertificateId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct VerifyQuery {
    pub id: Option<String>,
    pub hash: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyResponse {
    pub key_id: String,
    pub algorithm: String,
    pub public_key: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/public/verify", get(public_verify))
        .route("/v1/public/key", get(public_key))
}

fn locate(query: &VerifyQuery) -> Result<CertificateLocator, String> {
    fn present(v: &Option<String>) -> Option<&str> {
        v.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
    match (present(&query.id), present(&query.hash)) {
        (Some(id), None) => CertificateId::parse(id)
            .map(CertificateLocator::Id)
            .map_err(|_| format!("{id:?} is not a certificate id")),
        (None, Some(hash)) => normalize_content_hash(hash)
            .map(CertificateLocator::ContentHash)
            .ok_or_else(|| format!("{hash:?} is not a hex content hash")),
        (Some(_), Some(_)) => Err("supply either id or hash, not both".to_string()),
        (None, None) => Err("an id or hash query parameter is required".to_string()),
    }
}

async fn public_verify(State(state): State<AppState>, Query(query): Query<VerifyQuery>) -> Response {
    let now = Timestamp::now();
    let result = match locate(&query) {
        Ok(locator) => state.verifier.verify_at(&locator, now).await,
        Err(msg) => VerificationResult::failure_with(ReasonCode::InvalidInput, msg, now),
    };
    state.metrics.record_verification(result.reason);

    let (status, body) = PublicVerification::from_result(result, state.config.disclosure);
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let cache = if status.is_server_error() {
        HeaderValue::from_static("no-store")
    } else {
        HeaderValue::from_str(&format!("public, max-age={}", state.config.public_cache_ttl_secs))
            .unwrap_or_else(|_| HeaderValue::from_static("no-store"))
    };
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(header::CACHE_CONTROL, cache);
    response
}

async fn public_key(State(state): State<AppState>) -> Json<PublicKeyResponse> {
    Json(PublicKeyResponse {
        key_id: state.key_id.clone(),
        algorithm: "Ed25519".to_string(),
        public_key: state.public_key_hex.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(id: Option<&str>, hash: Option<&str>) -> VerifyQuery {
        VerifyQuery {
            id: id.map(str::to_string),
            hash: hash.map(str::to_string),
        }
    }

    #[test]
    fn locator_from_query() {
        let id = CertificateId::new();
        assert_eq!(
            locate(&q(Some(&id.to_string()), None)).unwrap(),
            CertificateLocator::Id(id)
        );
        assert_eq!(
            locate(&q(None, Some("0xAbC"))).unwrap(),
            CertificateLocator::ContentHash("abc".into())
        );
        assert!(locate(&q(None, None)).is_err());
        assert!(locate(&q(Some(" "), None)).is_err());
        assert!(locate(&q(Some("x"), Some("ab"))).is_err());
        assert!(locate(&q(None, Some("not-a-hash"))).is_err());
    }
}
