//! # Certificates and Signed Metadata Snapshots
//!
//! A certificate binds a work fingerprint, its owner and an issuance policy
//! under an Ed25519 signature.
//!
//! ## Security Invariant
//!
//! The signature covers `canonicalize(metadataSnapshot)`. The snapshot is
//! stored as its canonical JSON string and never edited after issuance; a
//! legitimate change means a new certificate. Record fields that duplicate
//! snapshot fields (`workId`, `certificateType`, `issuedAt`, `expiresAt`)
//! must agree with the signed copy or verification reports
//! `SIGNATURE_INVALID`.
//!
//! ## Lifecycle
//!
//! ```text
//! ACTIVE ──(expiresAt < now)──▶ EXPIRED
//!   │                              │
//!   └───────────(revoke)───────────┴──▶ REVOKED   (terminal)
//! ```
//!
//! REVOKED takes precedence over EXPIRED everywhere it is reported.

use rcert_core::{CertificateId, ContentDigest, Timestamp, WorkId};
use rcert_crypto::Ed25519Signature;
use serde::{Deserialize, Serialize};

/// Snapshot schema version written by this issuer.
pub const CERTIFICATE_VERSION: u32 = 1;

/// Issuance tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateType {
    /// Expires after the policy's standard validity (365 days by default).
    Standard,
    /// Perpetual: `expiresAt` is null.
    Premium,
}

impl CertificateType {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Premium => "premium",
        }
    }
}

impl std::fmt::Display for CertificateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CertificateType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "premium" => Ok(Self::Premium),
            other => Err(format!("unknown certificate type {other:?}")),
        }
    }
}

/// The signed payload: work fields plus issuance parameters, frozen at
/// issuance. Owner contact data is not part of it; it stays on the work
/// record, where it can be changed or erased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MetadataSnapshot {
    pub work_id: WorkId,
    pub certificate_version: u32,
    pub certificate_type: CertificateType,
    pub title: String,
    #[serde(rename = "type")]
    pub work_type: String,
    pub category: String,
    pub owner_id: String,
    pub fingerprint: ContentDigest,
    pub issued_at: Timestamp,
    pub expires_at: Option<Timestamp>,
}

/// Derived lifecycle state at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateStatus {
    Active,
    Expired,
    Revoked,
}

/// A persisted certificate record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: CertificateId,
    pub work_id: WorkId,
    pub certificate_type: CertificateType,
    /// Canonical JSON of the [`MetadataSnapshot`], exactly as signed.
    pub metadata_snapshot: String,
    pub signature: Ed25519Signature,
    /// Reference to the signing key.
    pub key_id: String,
    pub issued_at: Timestamp,
    /// `None` means perpetual.
    pub expires_at: Option<Timestamp>,
    pub is_revoked: bool,
    pub revoked_at: Option<Timestamp>,
}

impl Certificate {
    /// Lifecycle state at `now`. Revocation wins over expiry; an
    /// `expiresAt` equal to `now` is still active.
    pub fn status_at(&self, now: Timestamp) -> CertificateStatus {
        if self.is_revoked {
            CertificateStatus::Revoked
        } else if self.is_expired_at(now) {
            CertificateStatus::Expired
        } else {
            CertificateStatus::Active
        }
    }

    /// `expiresAt < now`.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|exp| now.is_after(&exp))
    }

    /// Neither revoked nor expired at `now`; blocks reissuance of the same type.
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        self.status_at(now) == CertificateStatus::Active
    }

    /// Parse the stored snapshot.
    pub fn snapshot(&self) -> Result<MetadataSnapshot, serde_json::Error> {
        serde_json::from_str(&self.metadata_snapshot)
    }
}
