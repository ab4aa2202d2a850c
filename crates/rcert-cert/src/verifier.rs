//! # Verifier / Status Engine
//!
//! Read-only, fail-closed evaluation of a certificate's trust state. The
//! first failing step decides the result:
//!
//! | Step | Check                                             | Reason on failure   |
//! |------|---------------------------------------------------|---------------------|
//! | 1    | certificate exists                                | `NOT_FOUND`         |
//! | 2    | not revoked                                       | `REVOKED`           |
//! | 3    | `expiresAt` is null or `>= now`                   | `EXPIRED`           |
//! | 4    | snapshot is well-formed JSON                      | `CORRUPT_METADATA`  |
//! | 5    | signature over its canonical form is valid for `keyId` | `SIGNATURE_INVALID` |
//! | 5a   | signed snapshot decodes, version supported        | `CORRUPT_METADATA`  |
//! | 5b   | record fields match the signed snapshot           | `SIGNATURE_INVALID` |
//! | 6    | —                                                 | `VERIFIED`          |
//!
//! After step 6 an advisory anchor cross-check runs. Its outcome is
//! reported in `anchorCrossCheck` and never changes `verified`: the anchor
//! is supplementary evidence, a mismatch or an unreachable ledger is a
//! warning, not a verdict.
//!
//! Every evaluation runs on its own Tokio task. A panic anywhere inside it
//! surfaces as `INTERNAL_ERROR`, never as a pass.
//!
//! Steps 2–5 are exposed as [`evaluate_certificate`], a pure function a
//! third party can run with nothing but the certificate JSON and the
//! published public key.

use std::sync::Arc;

use rcert_anchor::{AnchorRecord, GuardedAnchor};
use rcert_core::{CanonicalBytes, CertificateId, ContentDigest, Timestamp, WorkId};
use rcert_crypto::{CryptoError, SignatureValidator};
use serde::{Deserialize, Serialize};

use crate::certificate::{
    Certificate, CertificateStatus, CertificateType, MetadataSnapshot, CERTIFICATE_VERSION,
};
use crate::locator::CertificateLocator;
use crate::store::{CertificateStore, StoreError, WorkRepository};

/// Why a verification passed or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    Verified,
    NotFound,
    Revoked,
    Expired,
    CorruptMetadata,
    SignatureInvalid,
    InternalError,
    InvalidInput,
    /// Per-item failure inside a batch.
    Error,
    /// Batch cancelled before the item was scheduled.
    Cancelled,
}

impl ReasonCode {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "VERIFIED",
            Self::NotFound => "NOT_FOUND",
            Self::Revoked => "REVOKED",
            Self::Expired => "EXPIRED",
            Self::CorruptMetadata => "CORRUPT_METADATA",
            Self::SignatureInvalid => "SIGNATURE_INVALID",
            Self::InternalError => "INTERNAL_ERROR",
            Self::InvalidInput => "INVALID_INPUT",
            Self::Error => "ERROR",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Short human-readable explanation.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::Verified => "certificate is valid",
            Self::NotFound => "no certificate matches this identifier",
            Self::Revoked => "certificate has been revoked",
            Self::Expired => "certificate has expired",
            Self::CorruptMetadata => "certificate metadata is unreadable",
            Self::SignatureInvalid => "certificate signature does not match its metadata",
            Self::InternalError => "verification could not be completed",
            Self::InvalidInput => "identifier must be a certificate id or a hex content hash",
            Self::Error => "verification failed for this item",
            Self::Cancelled => "batch was cancelled before this item was verified",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the advisory anchor lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnchorCrossCheck {
    /// Ledger holds exactly the fingerprint.
    Match,
    /// Ledger holds a different hash under this fingerprint.
    Mismatch,
    /// No ledger entry.
    Absent,
    /// Ledger timed out or errored.
    Unavailable,
    /// Not performed (no ledger configured, or the certificate failed).
    Skipped,
}

/// Certificate projection returned with a result.
///
/// Record fields are always present. Snapshot fields are filled when the
/// snapshot parses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateView {
    pub id: CertificateId,
    pub work_id: WorkId,
    pub certificate_type: CertificateType,
    pub status: CertificateStatus,
    pub key_id: String,
    pub issued_at: Timestamp,
    pub expires_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub work_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    /// From the work record, never from the signed snapshot. Filled by
    /// [`Verifier`] only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<ContentDigest>,
}

impl CertificateView {
    fn new(cert: &Certificate, snapshot: Option<&MetadataSnapshot>, now: Timestamp) -> Self {
        Self {
            id: cert.id,
            work_id: cert.work_id,
            certificate_type: cert.certificate_type,
            status: cert.status_at(now),
            key_id: cert.key_id.clone(),
            issued_at: cert.issued_at,
            expires_at: cert.expires_at,
            revoked_at: cert.revoked_at,
            title: snapshot.map(|s| s.title.clone()),
            work_type: snapshot.map(|s| s.work_type.clone()),
            category: snapshot.map(|s| s.category.clone()),
            owner_id: snapshot.map(|s| s.owner_id.clone()),
            owner_email: None,
            fingerprint: snapshot.map(|s| s.fingerprint.clone()),
        }
    }

    /// Strip personal data.
    pub fn redacted(mut self) -> Self {
        self.owner_email = None;
        self
    }
}

/// The verdict for one certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub verified: bool,
    pub reason: ReasonCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<CertificateView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<Timestamp>,
    pub anchor_cross_check: AnchorCrossCheck,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<AnchorRecord>,
    pub checked_at: Timestamp,
}

impl VerificationResult {
    /// A failed result with the reason's default message.
    pub fn failure(reason: ReasonCode, checked_at: Timestamp) -> Self {
        Self::failure_with(reason, reason.default_message(), checked_at)
    }

    /// A failed result with a custom message.
    pub fn failure_with(reason: ReasonCode, message: impl Into<String>, checked_at: Timestamp) -> Self {
        Self {
            verified: false,
            reason,
            message: message.into(),
            certificate: None,
            revoked_at: None,
            anchor_cross_check: AnchorCrossCheck::Skipped,
            anchor: None,
            checked_at,
        }
    }

    fn with_certificate(mut self, view: CertificateView) -> Self {
        self.certificate = Some(view);
        self
    }

    /// Drop personal data from the certificate view.
    pub fn redacted(mut self) -> Self {
        self.certificate = self.certificate.map(CertificateView::redacted);
        self
    }
}

// ─── Pure evaluation ─────────────────────────────────────────────────────

/// Steps 2–5 on an already-loaded certificate. No I/O, no clock.
pub fn evaluate_certificate(
    cert: &Certificate,
    validator: &dyn SignatureValidator,
    now: Timestamp,
) -> VerificationResult {
    let parsed: Option<serde_json::Value> = serde_json::from_str(&cert.metadata_snapshot).ok();
    let snapshot: Option<MetadataSnapshot> = parsed
        .as_ref()
        .and_then(|v| serde_json::from_value(v.clone()).ok());
    let view = CertificateView::new(cert, snapshot.as_ref(), now);

    if cert.is_revoked {
        let at = cert.revoked_at;
        let message = match at {
            Some(t) => format!("certificate was revoked at {t}"),
            None => ReasonCode::Revoked.default_message().to_string(),
        };
        let mut result = VerificationResult::failure_with(ReasonCode::Revoked, message, now)
            .with_certificate(view);
        result.revoked_at = at;
        return result;
    }

    if let Some(exp) = cert.expires_at.filter(|_| cert.is_expired_at(now)) {
        return VerificationResult::failure_with(
            ReasonCode::Expired,
            format!("certificate expired at {exp}"),
            now,
        )
        .with_certificate(view);
    }

    let Some(value) = parsed else {
        return VerificationResult::failure(ReasonCode::CorruptMetadata, now).with_certificate(view);
    };

    // Anything that parses is checked against the signature before its
    // shape is trusted.
    let signature_invalid = |message: String, view: &CertificateView| {
        VerificationResult::failure_with(ReasonCode::SignatureInvalid, message, now)
            .with_certificate(view.clone())
    };
    let Ok(canonical) = CanonicalBytes::from_value(value) else {
        return signature_invalid(ReasonCode::SignatureInvalid.default_message().to_string(), &view);
    };
    if let Err(e) = validator.validate(&canonical, &cert.signature, &cert.key_id) {
        let message = match e {
            CryptoError::UnknownKey(_) => "certificate was signed by an unknown key".to_string(),
            _ => ReasonCode::SignatureInvalid.default_message().to_string(),
        };
        return signature_invalid(message, &view);
    }

    let Some(snapshot) = snapshot else {
        return VerificationResult::failure_with(
            ReasonCode::CorruptMetadata,
            "signed metadata does not describe a certificate",
            now,
        )
        .with_certificate(view);
    };
    if snapshot.certificate_version != CERTIFICATE_VERSION {
        return VerificationResult::failure_with(
            ReasonCode::CorruptMetadata,
            format!("unsupported certificate version {}", snapshot.certificate_version),
            now,
        )
        .with_certificate(view);
    }

    let bound = snapshot.work_id == cert.work_id
        && snapshot.certificate_type == cert.certificate_type
        && snapshot.issued_at == cert.issued_at
        && snapshot.expires_at == cert.expires_at;
    if !bound {
        return signature_invalid(
            "certificate record does not match its signed metadata".to_string(),
            &view,
        );
    }

    VerificationResult {
        verified: true,
        reason: ReasonCode::Verified,
        message: ReasonCode::Verified.default_message().to_string(),
        certificate: Some(view),
        revoked_at: None,
        anchor_cross_check: AnchorCrossCheck::Skipped,
        anchor: None,
        checked_at: now,
    }
}

// ─── Verifier ────────────────────────────────────────────────────────────

/// Resolves certificates from the store and evaluates them.
///
/// Cheap to clone; all state is behind `Arc`s. Stateless between calls and
/// safe to run arbitrarily in parallel.
#[derive(Clone)]
pub struct Verifier {
    store: Arc<dyn CertificateStore>,
    works: Arc<dyn WorkRepository>,
    validator: Arc<dyn SignatureValidator>,
    anchor: Option<GuardedAnchor>,
}

impl Verifier {
    pub fn new(
        store: Arc<dyn CertificateStore>,
        works: Arc<dyn WorkRepository>,
        validator: Arc<dyn SignatureValidator>,
    ) -> Self {
        Self {
            store,
            works,
            validator,
            anchor: None,
        }
    }

    /// Cross-check verified certificates against `anchor`.
    pub fn with_anchor(mut self, anchor: GuardedAnchor) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Verify at the current time.
    pub async fn verify(&self, locator: &CertificateLocator) -> VerificationResult {
        self.verify_at(locator, Timestamp::now()).await
    }

    /// Verify at `now`. Deterministic for a fixed store state and `now`,
    /// apart from the anchor cross-check.
    pub async fn verify_at(&self, locator: &CertificateLocator, now: Timestamp) -> VerificationResult {
        let this = self.clone();
        let locator = locator.clone();
        let task = tokio::spawn(async move { this.run(&locator, now).await });
        match task.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "verification task failed");
                VerificationResult::failure(ReasonCode::InternalError, now)
            }
        }
    }

    /// Parse a caller-supplied identifier, then verify. Malformed input is
    /// an `INVALID_INPUT` result, not an error.
    pub async fn verify_str(&self, raw: &str, now: Timestamp) -> VerificationResult {
        match CertificateLocator::parse(raw) {
            Ok(locator) => self.verify_at(&locator, now).await,
            Err(e) => VerificationResult::failure_with(ReasonCode::InvalidInput, e.to_string(), now),
        }
    }

    fn resolve(&self, locator: &CertificateLocator) -> Result<Option<Certificate>, StoreError> {
        match locator {
            CertificateLocator::Id(id) => self.store.get(id),
            CertificateLocator::ContentHash(hash) => match self.works.find_by_content_hash(hash)? {
                Some(work) => self.store.latest_for_work(&work.id),
                None => Ok(None),
            },
        }
    }

    async fn run(&self, locator: &CertificateLocator, now: Timestamp) -> VerificationResult {
        let cert = match self.resolve(locator) {
            Ok(Some(cert)) => cert,
            Ok(None) => {
                tracing::debug!(locator = %locator, "certificate not found");
                return VerificationResult::failure(ReasonCode::NotFound, now);
            }
            Err(e) => {
                tracing::error!(locator = %locator, error = %e, "certificate lookup failed");
                return VerificationResult::failure(ReasonCode::InternalError, now);
            }
        };

        let mut result = evaluate_certificate(&cert, self.validator.as_ref(), now);
        if let Some(view) = result.certificate.as_mut() {
            view.owner_email = self.owner_contact(&cert.work_id);
        }
        if result.verified {
            self.cross_check(&mut result).await;
        }
        tracing::info!(
            certificate_id = %cert.id,
            reason = %result.reason,
            anchor = ?result.anchor_cross_check,
            "certificate verified"
        );
        result
    }

    fn owner_contact(&self, work_id: &WorkId) -> Option<String> {
        match self.works.get(work_id) {
            Ok(work) => work.and_then(|w| w.owner_email),
            Err(e) => {
                tracing::warn!(work_id = %work_id, error = %e, "owner contact lookup failed");
                None
            }
        }
    }

    async fn cross_check(&self, result: &mut VerificationResult) {
        let Some(anchor) = &self.anchor else {
            return;
        };
        let Some(fp) = result.certificate.as_ref().and_then(|c| c.fingerprint.clone()) else {
            return;
        };
        match anchor.lookup(&fp).await {
            Ok(Some(record)) => {
                if record.matches(&fp) {
                    result.anchor_cross_check = AnchorCrossCheck::Match;
                } else {
                    tracing::warn!(
                        fingerprint = %fp,
                        anchored_hash = %record.anchored_hash,
                        network = %record.network_name,
                        "anchor mismatch; verification result unchanged"
                    );
                    result.anchor_cross_check = AnchorCrossCheck::Mismatch;
                }
                result.anchor = Some(record);
            }
            Ok(None) => result.anchor_cross_check = AnchorCrossCheck::Absent,
            Err(e) => {
                tracing::warn!(fingerprint = %fp, error = %e, "anchor unavailable");
                result.anchor_cross_check = AnchorCrossCheck::Unavailable;
            }
        }
    }
}
