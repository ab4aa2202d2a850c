//! # Certificate Issuer
//!
//! `issue(work, type, policy)`:
//!
//! 1. Fingerprint the work (`InvalidInput` on missing fields).
//! 2. Build the [`MetadataSnapshot`] and sign its canonical bytes.
//! 3. Insert through [`CertificateStore::insert_unique_active`]; the loser
//!    of a race gets `DuplicateCertificate`.
//! 4. If an anchor is configured and the policy asks for it, spawn the
//!    anchoring on the current Tokio runtime and return without waiting.
//!    The anchor result is attached to the work when it arrives.
//!
//! The signer is injected at construction; the issuer never reads key
//! material from the environment.

use std::sync::Arc;

use chrono::Duration;
use rcert_anchor::GuardedAnchor;
use rcert_core::{CanonicalBytes, CertificateId, ContentDigest, Timestamp, WorkId};
use rcert_crypto::SignerService;

use crate::certificate::{Certificate, CertificateType, MetadataSnapshot, CERTIFICATE_VERSION};
use crate::error::CertError;
use crate::fingerprint::fingerprint;
use crate::store::{CertificateStore, StoreError, WorkRepository};
use crate::work::Work;

/// Issuance parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuancePolicy {
    /// Lifetime of a `standard` certificate.
    pub standard_validity: Duration,
    /// Request an anchor for the fingerprint after issuing.
    pub anchor_on_issue: bool,
}

impl Default for IssuancePolicy {
    fn default() -> Self {
        Self {
            standard_validity: Duration::days(365),
            anchor_on_issue: true,
        }
    }
}

impl IssuancePolicy {
    /// `issuedAt + standard_validity` for standard, `None` for premium.
    pub fn expires_at(
        &self,
        certificate_type: CertificateType,
        issued_at: Timestamp,
    ) -> Result<Option<Timestamp>, CertError> {
        match certificate_type {
            CertificateType::Premium => Ok(None),
            CertificateType::Standard => issued_at
                .checked_add(self.standard_validity)
                .map(Some)
                .ok_or_else(|| CertError::InvalidInput("expiry overflows the calendar".to_string())),
        }
    }
}

/// Builds, signs and stores certificates.
#[derive(Clone)]
pub struct CertificateIssuer {
    signer: Arc<dyn SignerService>,
    store: Arc<dyn CertificateStore>,
    works: Arc<dyn WorkRepository>,
    anchor: Option<GuardedAnchor>,
}

impl CertificateIssuer {
    pub fn new(
        signer: Arc<dyn SignerService>,
        store: Arc<dyn CertificateStore>,
        works: Arc<dyn WorkRepository>,
    ) -> Self {
        Self {
            signer,
            store,
            works,
            anchor: None,
        }
    }

    /// Anchor fingerprints through `anchor` after issuance.
    pub fn with_anchor(mut self, anchor: GuardedAnchor) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Issue at the current time.
    pub fn issue(
        &self,
        work: &Work,
        certificate_type: CertificateType,
        policy: &IssuancePolicy,
    ) -> Result<Certificate, CertError> {
        self.issue_at(work, certificate_type, policy, Timestamp::now())
    }

    /// Issue with an explicit `issuedAt`.
    pub fn issue_at(
        &self,
        work: &Work,
        certificate_type: CertificateType,
        policy: &IssuancePolicy,
        issued_at: Timestamp,
    ) -> Result<Certificate, CertError> {
        let fp = fingerprint(work)?;
        let expires_at = policy.expires_at(certificate_type, issued_at)?;

        let snapshot = MetadataSnapshot {
            work_id: work.id,
            certificate_version: CERTIFICATE_VERSION,
            certificate_type,
            title: work.title.clone(),
            work_type: work.work_type.clone(),
            category: work.category.clone(),
            owner_id: work.owner_id.clone(),
            fingerprint: fp.clone(),
            issued_at,
            expires_at,
        };
        let canonical = CanonicalBytes::new(&snapshot)
            .map_err(|e| CertError::Internal(format!("snapshot canonicalization: {e}")))?;
        let signature = self.signer.sign(&canonical)?;

        let cert = Certificate {
            id: CertificateId::new(),
            work_id: work.id,
            certificate_type,
            metadata_snapshot: canonical.as_str().to_string(),
            signature,
            key_id: self.signer.key_id().to_string(),
            issued_at,
            expires_at,
            is_revoked: false,
            revoked_at: None,
        };

        self.store
            .insert_unique_active(cert.clone(), issued_at)
            .map_err(|e| match e {
                StoreError::Duplicate(existing) => CertError::DuplicateCertificate {
                    work_id: work.id,
                    certificate_type,
                    existing,
                },
                other => CertError::Store(other),
            })?;

        tracing::info!(
            certificate_id = %cert.id,
            work_id = %work.id,
            certificate_type = %certificate_type,
            key_id = %cert.key_id,
            "certificate issued"
        );

        if policy.anchor_on_issue {
            self.spawn_anchor(work.id, fp);
        }
        Ok(cert)
    }

    fn spawn_anchor(&self, work_id: WorkId, fp: ContentDigest) {
        let Some(anchor) = self.anchor.clone() else {
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!(work_id = %work_id, "no async runtime; anchor request skipped");
            return;
        };
        let works = Arc::clone(&self.works);
        handle.spawn(async move {
            match anchor.anchor(&fp).await {
                Ok(record) => {
                    tracing::info!(
                        work_id = %work_id,
                        network = %record.network_name,
                        transaction_id = %record.transaction_id,
                        "fingerprint anchored"
                    );
                    if let Err(e) = works.attach_anchor(&work_id, record) {
                        tracing::warn!(work_id = %work_id, error = %e, "could not attach anchor to work");
                    }
                }
                Err(e) => {
                    tracing::warn!(work_id = %work_id, error = %e, "anchoring failed; certificate unaffected");
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryCertificateStore, InMemoryWorkRepository};
    use rcert_crypto::LocalSigner;

    fn work() -> Work {
        Work {
            id: WorkId::new(),
            title: "Neon Dreams".into(),
            work_type: "music".into(),
            category: "electronic".into(),
            owner_id: "artist-7".into(),
            owner_email: None,
            content_hash: "0xAAA".into(),
            keywords: vec![],
            created_at: Timestamp::now(),
        }
    }

    fn issuer() -> CertificateIssuer {
        CertificateIssuer::new(
            Arc::new(LocalSigner::from_seed(&[5u8; 32])),
            Arc::new(InMemoryCertificateStore::new()),
            Arc::new(InMemoryWorkRepository::new()),
        )
    }

    #[test]
    fn standard_expires_after_365_days() {
        let at = Timestamp::parse("2026-03-01T12:00:00Z").unwrap();
        let cert = issuer()
            .issue_at(&work(), CertificateType::Standard, &IssuancePolicy::default(), at)
            .unwrap();
        assert_eq!(cert.issued_at, at);
        assert_eq!(cert.expires_at.unwrap().to_iso8601(), "2027-03-01T12:00:00Z");
    }

    #[test]
    fn premium_is_perpetual() {
        let cert = issuer()
            .issue(&work(), CertificateType::Premium, &IssuancePolicy::default())
            .unwrap();
        assert!(cert.expires_at.is_none());
        assert!(cert.snapshot().unwrap().expires_at.is_none());
    }

    #[test]
    fn snapshot_is_canonical_and_complete() {
        let w = work();
        let cert = issuer()
            .issue(&w, CertificateType::Standard, &IssuancePolicy::default())
            .unwrap();
        let snap = cert.snapshot().unwrap();
        assert_eq!(snap.work_id, w.id);
        assert_eq!(snap.certificate_version, CERTIFICATE_VERSION);
        assert_eq!(snap.fingerprint, fingerprint(&w).unwrap());
        let recanon = CanonicalBytes::new(&snap).unwrap();
        assert_eq!(recanon.as_str(), cert.metadata_snapshot);
    }

    #[test]
    fn duplicate_is_rejected() {
        let iss = issuer();
        let w = work();
        let policy = IssuancePolicy::default();
        let first = iss.issue(&w, CertificateType::Standard, &policy).unwrap();
        match iss.issue(&w, CertificateType::Standard, &policy) {
            Err(CertError::DuplicateCertificate { existing, .. }) => {
                assert_eq!(existing, first.id.to_string())
            }
            other => panic!("expected duplicate, got {other:?}"),
        }
    }

    #[test]
    fn invalid_work_is_rejected_before_signing() {
        let mut w = work();
        w.title.clear();
        assert!(matches!(
            issuer().issue(&w, CertificateType::Standard, &IssuancePolicy::default()),
            Err(CertError::InvalidInput(_))
        ));
    }
}
