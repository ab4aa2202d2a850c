//! # Certificate Engine Errors
//!
//! Returned by `issue` and `revoke`. Verification never returns these; it
//! folds every failure into a [`crate::ReasonCode`].

use rcert_core::{CertificateId, ValidationError, WorkId};
use rcert_crypto::CryptoError;
use thiserror::Error;

use crate::certificate::CertificateType;
use crate::store::StoreError;

/// Errors from certificate issuance and revocation.
#[derive(Error, Debug)]
pub enum CertError {
    /// A required work field is missing or malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The certificate (or its work) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An active certificate of this type already exists for the work.
    #[error("work {work_id} already has an active {certificate_type} certificate ({existing})")]
    DuplicateCertificate {
        /// The work.
        work_id: WorkId,
        /// The contested certificate type.
        certificate_type: CertificateType,
        /// The certificate that is still active.
        existing: String,
    },

    /// The actor may not revoke this certificate.
    #[error("actor {actor} may not revoke certificate {certificate_id}")]
    AuthorizationDenied {
        /// Who asked.
        actor: String,
        /// What they asked for.
        certificate_id: CertificateId,
    },

    /// The signing backend is unavailable or failed.
    #[error("signing failure: {0}")]
    SigningFailure(#[from] CryptoError),

    /// The certificate or work store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Unexpected internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ValidationError> for CertError {
    fn from(e: ValidationError) -> Self {
        Self::InvalidInput(e.to_string())
    }
}
