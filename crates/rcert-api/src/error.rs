//! # API Error Types
//!
//! Maps engine errors to HTTP status codes with a JSON body
//! `{"error": {"code", "message"}}`. Internal details are logged, never
//! returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rcert_batch::BatchError;
use rcert_cert::{CertError, StoreError};
use rcert_core::ValidationError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable code, e.g. `DUPLICATE_CERTIFICATE`.
    pub code: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    /// 404.
    #[error("not found: {0}")]
    NotFound(String),

    /// 422.
    #[error("validation error: {0}")]
    Validation(String),

    /// 400.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// 401.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// 403.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// 409, duplicate active certificate.
    #[error("{0}")]
    DuplicateCertificate(String),

    /// 409, batch still has pending items.
    #[error("{0}")]
    ExportNotReady(String),

    /// 503.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// 500. Message is logged but not returned to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "AUTHORIZATION_DENIED"),
            Self::DuplicateCertificate(_) => (StatusCode::CONFLICT, "DUPLICATE_CERTIFICATE"),
            Self::ExportNotReady(_) => (StatusCode::CONFLICT, "EXPORT_NOT_READY"),
            Self::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self {
            Self::Internal(_) => "an internal error occurred".to_string(),
            other => other.to_string(),
        };
        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }
        (status, Json(ErrorBody::new(code, message))).into_response()
    }
}

impl From<CertError> for AppError {
    fn from(err: CertError) -> Self {
        match err {
            CertError::InvalidInput(msg) => Self::Validation(msg),
            CertError::NotFound(msg) => Self::NotFound(msg),
            e @ CertError::DuplicateCertificate { .. } => Self::DuplicateCertificate(e.to_string()),
            e @ CertError::AuthorizationDenied { .. } => Self::Forbidden(e.to_string()),
            CertError::SigningFailure(e) => Self::Unavailable(format!("signing backend: {e}")),
            e @ (CertError::Store(_) | CertError::Internal(_)) => Self::Internal(e.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<BatchError> for AppError {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::InvalidInput(msg) => Self::BadRequest(msg),
            e @ BatchError::ExportNotReady { .. } => Self::ExportNotReady(e.to_string()),
            e @ BatchError::Scheduling(_) => Self::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcert_cert::CertificateType;
    use rcert_core::{BatchId, CertificateId, WorkId};

    #[test]
    fn cert_errors_map_to_statuses() {
        let dup: AppError = CertError::DuplicateCertificate {
            work_id: WorkId::new(),
            certificate_type: CertificateType::Standard,
            existing: "x".into(),
        }
        .into();
        assert_eq!(dup.status_and_code(), (StatusCode::CONFLICT, "DUPLICATE_CERTIFICATE"));

        let denied: AppError = CertError::AuthorizationDenied {
            actor: "eve".into(),
            certificate_id: CertificateId::new(),
        }
        .into();
        assert_eq!(denied.status_and_code().0, StatusCode::FORBIDDEN);

        let invalid: AppError = CertError::InvalidInput("title".into()).into();
        assert_eq!(invalid.status_and_code().0, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn export_not_ready_is_conflict() {
        let err: AppError = BatchError::ExportNotReady {
            batch_id: BatchId::new(),
            pending: 2,
        }
        .into();
        assert_eq!(err.status_and_code(), (StatusCode::CONFLICT, "EXPORT_NOT_READY"));
    }

    #[test]
    fn internal_message_is_hidden() {
        let resp = AppError::Internal("db password wrong".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
