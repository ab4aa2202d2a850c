//! # Persistence Boundary
//!
//! Certificates and works live in an external store. Two traits describe
//! what the engine needs from it; in-memory implementations back the API
//! binary and the tests.
//!
//! ## Concurrency
//!
//! - [`CertificateStore::insert_unique_active`] is the uniqueness
//!   constraint for `(workId, certificateType)`. The check and the insert
//!   happen under one write lock, so of two racing issuers exactly one
//!   succeeds and the other gets [`StoreError::Duplicate`].
//! - [`CertificateStore::revoke`] flips `isRevoked`/`revokedAt` together
//!   under the write lock. Readers see the whole record before or after,
//!   never half of it.

use std::collections::HashMap;

use parking_lot::RwLock;
use rcert_anchor::AnchorRecord;
use rcert_core::{CertificateId, Timestamp, WorkId};
use thiserror::Error;

use crate::certificate::Certificate;
use crate::locator::normalize_content_hash;
use crate::work::Work;

/// Store failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No such record.
    #[error("{0} not found")]
    NotFound(String),

    /// A uniqueness constraint was violated; carries the conflicting id.
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// The backend failed.
    #[error("backend failure: {0}")]
    Backend(String),
}

/// Outcome of a revocation at the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevocationOutcome {
    /// This call revoked the certificate.
    Revoked {
        /// Time recorded on the certificate.
        at: Timestamp,
    },
    /// It was already revoked; nothing changed.
    AlreadyRevoked {
        /// The original revocation time.
        at: Timestamp,
    },
}

impl RevocationOutcome {
    /// The revocation time now on the record.
    pub fn revoked_at(&self) -> Timestamp {
        match self {
            Self::Revoked { at } | Self::AlreadyRevoked { at } => *at,
        }
    }
}

/// Certificate persistence.
pub trait CertificateStore: Send + Sync {
    /// Fetch by id.
    fn get(&self, id: &CertificateId) -> Result<Option<Certificate>, StoreError>;

    /// The most recently issued certificate for a work, any status.
    fn latest_for_work(&self, work_id: &WorkId) -> Result<Option<Certificate>, StoreError>;

    /// Insert unless an active certificate of the same type exists for the
    /// work at `now`. Check and insert are atomic.
    fn insert_unique_active(&self, cert: Certificate, now: Timestamp) -> Result<(), StoreError>;

    /// Mark revoked at `at`. Idempotent: an already-revoked certificate
    /// keeps its original time.
    fn revoke(&self, id: &CertificateId, at: Timestamp) -> Result<RevocationOutcome, StoreError>;
}

/// Work persistence and anchor attachment.
pub trait WorkRepository: Send + Sync {
    /// Fetch by id.
    fn get(&self, id: &WorkId) -> Result<Option<Work>, StoreError>;

    /// Find the work registered with `content_hash` (normalized form).
    fn find_by_content_hash(&self, content_hash: &str) -> Result<Option<Work>, StoreError>;

    /// Attach an anchor record to a work.
    fn attach_anchor(&self, id: &WorkId, record: AnchorRecord) -> Result<(), StoreError>;

    /// The anchor attached to a work, if any.
    fn anchor_for(&self, id: &WorkId) -> Result<Option<AnchorRecord>, StoreError>;
}

// ─── In-memory certificate store ────────────────────────────────────────

#[derive(Default)]
struct CertTable {
    by_id: HashMap<CertificateId, Certificate>,
    /// Insertion order, for "latest" lookups.
    order: Vec<CertificateId>,
}

/// `RwLock<HashMap>` certificate store.
#[derive(Default)]
pub struct InMemoryCertificateStore {
    table: RwLock<CertTable>,
}

impl InMemoryCertificateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored certificates.
    pub fn len(&self) -> usize {
        self.table.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overwrite a stored record verbatim, bypassing every invariant.
    /// Simulates storage-level tampering; no engine path calls it.
    #[cfg(feature = "test-util")]
    pub fn replace_record(&self, cert: Certificate) -> Result<(), StoreError> {
        let mut table = self.table.write();
        match table.by_id.get_mut(&cert.id) {
            Some(slot) => {
                *slot = cert;
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("certificate {}", cert.id))),
        }
    }
}

impl CertificateStore for InMemoryCertificateStore {
    fn get(&self, id: &CertificateId) -> Result<Option<Certificate>, StoreError> {
        Ok(self.table.read().by_id.get(id).cloned())
    }

    fn latest_for_work(&self, work_id: &WorkId) -> Result<Option<Certificate>, StoreError> {
        let table = self.table.read();
        Ok(table
            .order
            .iter()
            .rev()
            .filter_map(|id| table.by_id.get(id))
            .find(|c| &c.work_id == work_id)
            .cloned())
    }

    fn insert_unique_active(&self, cert: Certificate, now: Timestamp) -> Result<(), StoreError> {
        let mut table = self.table.write();
        if let Some(existing) = table.by_id.values().find(|c| {
            c.work_id == cert.work_id
                && c.certificate_type == cert.certificate_type
                && c.is_active_at(now)
        }) {
            return Err(StoreError::Duplicate(existing.id.to_string()));
        }
        if table.by_id.contains_key(&cert.id) {
            return Err(StoreError::Duplicate(cert.id.to_string()));
        }
        table.order.push(cert.id);
        table.by_id.insert(cert.id, cert);
        Ok(())
    }

    fn revoke(&self, id: &CertificateId, at: Timestamp) -> Result<RevocationOutcome, StoreError> {
        let mut table = self.table.write();
        let cert = table
            .by_id
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("certificate {id}")))?;
        if cert.is_revoked {
            return Ok(RevocationOutcome::AlreadyRevoked {
                at: cert.revoked_at.unwrap_or(at),
            });
        }
        cert.is_revoked = true;
        cert.revoked_at = Some(at);
        Ok(RevocationOutcome::Revoked { at })
    }
}

// ─── In-memory work repository ──────────────────────────────────────────

#[derive(Default)]
struct WorkTable {
    works: HashMap<WorkId, Work>,
    by_hash: HashMap<String, WorkId>,
    anchors: HashMap<WorkId, AnchorRecord>,
}

/// `RwLock<HashMap>` work repository.
#[derive(Default)]
pub struct InMemoryWorkRepository {
    table: RwLock<WorkTable>,
}

impl InMemoryWorkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a work. The content hash index points at the most recent
    /// registration carrying that hash.
    pub fn register(&self, work: Work) -> Result<(), StoreError> {
        let hash = normalize_content_hash(&work.content_hash)
            .ok_or_else(|| StoreError::Backend(format!("unindexable content hash for work {}", work.id)))?;
        let mut table = self.table.write();
        if table.works.contains_key(&work.id) {
            return Err(StoreError::Duplicate(work.id.to_string()));
        }
        table.by_hash.insert(hash, work.id);
        table.works.insert(work.id, work);
        Ok(())
    }

    /// Number of registered works.
    pub fn len(&self) -> usize {
        self.table.read().works.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl WorkRepository for InMemoryWorkRepository {
    fn get(&self, id: &WorkId) -> Result<Option<Work>, StoreError> {
        Ok(self.table.read().works.get(id).cloned())
    }

    fn find_by_content_hash(&self, content_hash: &str) -> Result<Option<Work>, StoreError> {
        let Some(key) = normalize_content_hash(content_hash) else {
            return Ok(None);
        };
        let table = self.table.read();
        Ok(table
            .by_hash
            .get(&key)
            .and_then(|id| table.works.get(id))
            .cloned())
    }

    fn attach_anchor(&self, id: &WorkId, record: AnchorRecord) -> Result<(), StoreError> {
        let mut table = self.table.write();
        if !table.works.contains_key(id) {
            return Err(StoreError::NotFound(format!("work {id}")));
        }
        table.anchors.insert(*id, record);
        Ok(())
    }

    fn anchor_for(&self, id: &WorkId) -> Result<Option<AnchorRecord>, StoreError> {
        Ok(self.table.read().anchors.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::CertificateType;
    use rcert_crypto::Ed25519Signature;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn cert(work_id: WorkId, ty: CertificateType, expires_at: Option<Timestamp>) -> Certificate {
        Certificate {
            id: CertificateId::new(),
            work_id,
            certificate_type: ty,
            metadata_snapshot: "{}".into(),
            signature: Ed25519Signature([1u8; 64]),
            key_id: "ed25519:test".into(),
            issued_at: ts("2026-01-01T00:00:00Z"),
            expires_at,
            is_revoked: false,
            revoked_at: None,
        }
    }

    #[test]
    fn second_active_of_same_type_is_duplicate() {
        let store = InMemoryCertificateStore::new();
        let work = WorkId::new();
        let now = ts("2026-01-02T00:00:00Z");
        let first = cert(work, CertificateType::Standard, None);
        let first_id = first.id;
        store.insert_unique_active(first, now).unwrap();
        let err = store
            .insert_unique_active(cert(work, CertificateType::Standard, None), now)
            .unwrap_err();
        assert_eq!(err, StoreError::Duplicate(first_id.to_string()));
        // Other type is unaffected.
        store
            .insert_unique_active(cert(work, CertificateType::Premium, None), now)
            .unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn revoked_or_expired_does_not_block_reissue() {
        let store = InMemoryCertificateStore::new();
        let work = WorkId::new();
        let now = ts("2026-06-01T00:00:00Z");

        let expired = cert(work, CertificateType::Standard, Some(ts("2026-05-31T23:59:59Z")));
        store.insert_unique_active(expired, now).unwrap();
        store
            .insert_unique_active(cert(work, CertificateType::Standard, None), now)
            .unwrap();

        let premium = cert(work, CertificateType::Premium, None);
        let premium_id = premium.id;
        store.insert_unique_active(premium, now).unwrap();
        store.revoke(&premium_id, now).unwrap();
        store
            .insert_unique_active(cert(work, CertificateType::Premium, None), now)
            .unwrap();
    }

    #[test]
    fn revoke_is_idempotent_and_keeps_first_time() {
        let store = InMemoryCertificateStore::new();
        let c = cert(WorkId::new(), CertificateType::Standard, None);
        let id = c.id;
        store.insert_unique_active(c, ts("2026-01-01T00:00:00Z")).unwrap();
        let first = store.revoke(&id, ts("2026-02-01T00:00:00Z")).unwrap();
        let second = store.revoke(&id, ts("2026-03-01T00:00:00Z")).unwrap();
        assert_eq!(first, RevocationOutcome::Revoked { at: ts("2026-02-01T00:00:00Z") });
        assert_eq!(second, RevocationOutcome::AlreadyRevoked { at: ts("2026-02-01T00:00:00Z") });
        let stored = store.get(&id).unwrap().unwrap();
        assert!(stored.is_revoked);
        assert_eq!(stored.revoked_at, Some(ts("2026-02-01T00:00:00Z")));
    }

    #[test]
    fn revoke_missing_is_not_found() {
        let store = InMemoryCertificateStore::new();
        assert!(matches!(
            store.revoke(&CertificateId::new(), Timestamp::now()),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn latest_for_work_prefers_newest_insert() {
        let store = InMemoryCertificateStore::new();
        let work = WorkId::new();
        let now = ts("2026-01-02T00:00:00Z");
        store.insert_unique_active(cert(work, CertificateType::Standard, None), now).unwrap();
        let newer = cert(work, CertificateType::Premium, None);
        let newer_id = newer.id;
        store.insert_unique_active(newer, now).unwrap();
        assert_eq!(store.latest_for_work(&work).unwrap().unwrap().id, newer_id);
        assert!(store.latest_for_work(&WorkId::new()).unwrap().is_none());
    }

    #[cfg(feature = "test-util")]
    #[test]
    fn replace_record_requires_existing() {
        let store = InMemoryCertificateStore::new();
        assert!(store
            .replace_record(cert(WorkId::new(), CertificateType::Standard, None))
            .is_err());
    }
}
