//! # Public Verification Projection
//!
//! What untrusted callers see. Always redacted; never carries the anchor
//! record or key material.
//!
//! ## Status mapping
//!
//! | Reason                               | HTTP |
//! |--------------------------------------|------|
//! | `VERIFIED`, `SIGNATURE_INVALID`      | 200  |
//! | `INVALID_INPUT`                      | 400  |
//! | `NOT_FOUND`                          | 404  |
//! | `REVOKED`, `EXPIRED`                 | 410  |
//! | `CORRUPT_METADATA`, `INTERNAL_ERROR` | 500  |
//!
//! ## Disclosure
//!
//! Distinguishing `NOT_FOUND` from `REVOKED` or `SIGNATURE_INVALID` tells
//! a caller whether an identifier ever existed. [`DisclosurePolicy::Detailed`]
//! keeps the distinction; [`DisclosurePolicy::Unified`] answers every
//! non-verified, non-malformed case with the same 404 body.

use rcert_core::Timestamp;
use serde::{Deserialize, Serialize};

use crate::verifier::{AnchorCrossCheck, CertificateView, ReasonCode, VerificationResult};

/// How much a failed public verification reveals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisclosurePolicy {
    /// Distinct reasons and statuses.
    #[default]
    Detailed,
    /// Not-found, revoked, expired and bad-signature collapse into one answer.
    Unified,
}

impl std::str::FromStr for DisclosurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "detailed" => Ok(Self::Detailed),
            "unified" => Ok(Self::Unified),
            other => Err(format!("unknown disclosure policy {other:?} (expected detailed|unified)")),
        }
    }
}

/// Message returned for every collapsed case under `Unified`.
pub const UNIFIED_MESSAGE: &str = "certificate could not be verified";

/// Public response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicVerification {
    pub verified: bool,
    pub message: String,
    pub reason: ReasonCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<CertificateView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<Timestamp>,
    pub anchor_cross_check: AnchorCrossCheck,
    pub checked_at: Timestamp,
}

impl PublicVerification {
    /// Project a verifier result under `policy`. Returns the HTTP status
    /// alongside the body.
    pub fn from_result(result: VerificationResult, policy: DisclosurePolicy) -> (u16, Self) {
        let result = result.redacted();
        let collapse = policy == DisclosurePolicy::Unified
            && matches!(
                result.reason,
                ReasonCode::NotFound
                    | ReasonCode::Revoked
                    | ReasonCode::Expired
                    | ReasonCode::SignatureInvalid
            );
        if collapse {
            return (
                404,
                Self {
                    verified: false,
                    message: UNIFIED_MESSAGE.to_string(),
                    reason: ReasonCode::NotFound,
                    certificate: None,
                    revoked_at: None,
                    anchor_cross_check: AnchorCrossCheck::Skipped,
                    checked_at: result.checked_at,
                },
            );
        }
        let status = http_status(result.reason);
        (
            status,
            Self {
                verified: result.verified,
                message: result.message,
                reason: result.reason,
                certificate: result.certificate,
                revoked_at: result.revoked_at,
                anchor_cross_check: result.anchor_cross_check,
                checked_at: result.checked_at,
            },
        )
    }
}

/// Detailed-policy status for a reason.
pub fn http_status(reason: ReasonCode) -> u16 {
    match reason {
        ReasonCode::Verified | ReasonCode::SignatureInvalid => 200,
        ReasonCode::InvalidInput => 400,
        ReasonCode::NotFound => 404,
        ReasonCode::Revoked | ReasonCode::Expired => 410,
        ReasonCode::CorruptMetadata
        | ReasonCode::InternalError
        | ReasonCode::Error
        | ReasonCode::Cancelled => 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(reason: ReasonCode) -> VerificationResult {
        VerificationResult::failure(reason, Timestamp::parse("2026-01-01T00:00:00Z").unwrap())
    }

    #[test]
    fn detailed_status_mapping() {
        let cases = [
            (ReasonCode::SignatureInvalid, 200),
            (ReasonCode::InvalidInput, 400),
            (ReasonCode::NotFound, 404),
            (ReasonCode::Revoked, 410),
            (ReasonCode::Expired, 410),
            (ReasonCode::CorruptMetadata, 500),
            (ReasonCode::InternalError, 500),
        ];
        for (reason, status) in cases {
            let (got, body) = PublicVerification::from_result(failed(reason), DisclosurePolicy::Detailed);
            assert_eq!(got, status, "{reason}");
            assert_eq!(body.reason, reason);
            assert!(!body.verified);
        }
    }

    #[test]
    fn unified_collapses_existence_leaks() {
        let mut bodies = Vec::new();
        for reason in [
            ReasonCode::NotFound,
            ReasonCode::Revoked,
            ReasonCode::Expired,
            ReasonCode::SignatureInvalid,
        ] {
            let (status, body) = PublicVerification::from_result(failed(reason), DisclosurePolicy::Unified);
            assert_eq!(status, 404);
            bodies.push(serde_json::to_string(&body).unwrap());
        }
        assert!(bodies.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn unified_keeps_malformed_and_internal_distinct() {
        let (s, _) = PublicVerification::from_result(failed(ReasonCode::InvalidInput), DisclosurePolicy::Unified);
        assert_eq!(s, 400);
        let (s, _) = PublicVerification::from_result(failed(ReasonCode::InternalError), DisclosurePolicy::Unified);
        assert_eq!(s, 500);
    }

    #[test]
    fn policy_parsing() {
        assert_eq!("Unified".parse::<DisclosurePolicy>().unwrap(), DisclosurePolicy::Unified);
        assert!("quiet".parse::<DisclosurePolicy>().is_err());
    }
}
