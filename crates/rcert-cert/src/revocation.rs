//! # Revocation Manager
//!
//! One-way `isRevoked: false → true`. The signed snapshot and signature
//! are left untouched for audit. Authorization is delegated to an
//! [`AuthzService`].
//!
//! Order: the certificate and its work are loaded first, so an unknown id
//! is `NotFound` for every caller. Authorization runs next and before any
//! mutation: an unauthorized actor gets `AuthorizationDenied` whether or
//! not the certificate is already revoked, and the record is unchanged.

use std::collections::HashSet;
use std::sync::Arc;

use rcert_core::{ActorId, CertificateId, Timestamp};

use crate::error::CertError;
use crate::store::{CertificateStore, RevocationOutcome, WorkRepository};
use crate::work::Work;

/// Decides who may revoke a work's certificates.
pub trait AuthzService: Send + Sync {
    fn can_revoke(&self, actor: &ActorId, work: &Work) -> bool;
}

/// The work's owner, or any configured admin actor.
#[derive(Debug, Clone, Default)]
pub struct OwnerOrAdminAuthz {
    admins: HashSet<String>,
}

impl OwnerOrAdminAuthz {
    pub fn new<I, S>(admins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            admins: admins.into_iter().map(Into::into).collect(),
        }
    }
}

impl AuthzService for OwnerOrAdminAuthz {
    fn can_revoke(&self, actor: &ActorId, work: &Work) -> bool {
        actor.as_str() == work.owner_id || self.admins.contains(actor.as_str())
    }
}

/// Applies revocations.
#[derive(Clone)]
pub struct RevocationManager {
    store: Arc<dyn CertificateStore>,
    works: Arc<dyn WorkRepository>,
    authz: Arc<dyn AuthzService>,
}

impl RevocationManager {
    pub fn new(
        store: Arc<dyn CertificateStore>,
        works: Arc<dyn WorkRepository>,
        authz: Arc<dyn AuthzService>,
    ) -> Self {
        Self { store, works, authz }
    }

    /// Revoke now.
    pub fn revoke(
        &self,
        certificate_id: &CertificateId,
        actor: &ActorId,
    ) -> Result<RevocationOutcome, CertError> {
        self.revoke_at(certificate_id, actor, Timestamp::now())
    }

    /// Revoke with an explicit timestamp. Revoking twice succeeds and
    /// reports the original time.
    pub fn revoke_at(
        &self,
        certificate_id: &CertificateId,
        actor: &ActorId,
        at: Timestamp,
    ) -> Result<RevocationOutcome, CertError> {
        let cert = self
            .store
            .get(certificate_id)?
            .ok_or_else(|| CertError::NotFound(format!("certificate {certificate_id}")))?;
        let work = self
            .works
            .get(&cert.work_id)?
            .ok_or_else(|| CertError::NotFound(format!("work {}", cert.work_id)))?;

        if !self.authz.can_revoke(actor, &work) {
            tracing::warn!(
                certificate_id = %certificate_id,
                actor = %actor,
                "revocation denied"
            );
            return Err(CertError::AuthorizationDenied {
                actor: actor.to_string(),
                certificate_id: *certificate_id,
            });
        }

        let outcome = self.store.revoke(certificate_id, at)?;
        match outcome {
            RevocationOutcome::Revoked { at } => tracing::info!(
                certificate_id = %certificate_id,
                actor = %actor,
                revoked_at = %at,
                "certificate revoked"
            ),
            RevocationOutcome::AlreadyRevoked { at } => tracing::debug!(
                certificate_id = %certificate_id,
                revoked_at = %at,
                "certificate already revoked"
            ),
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcert_core::WorkId;

    fn work(owner: &str) -> Work {
        Work {
            id: WorkId::new(),
            title: "t".into(),
            work_type: "music".into(),
            category: "c".into(),
            owner_id: owner.into(),
            owner_email: None,
            content_hash: "ab".into(),
            keywords: vec![],
            created_at: Timestamp::now(),
        }
    }

    #[test]
    fn owner_and_admin_may_revoke() {
        let authz = OwnerOrAdminAuthz::new(["admin-1"]);
        let w = work("owner-1");
        assert!(authz.can_revoke(&ActorId::new("owner-1").unwrap(), &w));
        assert!(authz.can_revoke(&ActorId::new("admin-1").unwrap(), &w));
        assert!(!authz.can_revoke(&ActorId::new("stranger").unwrap(), &w));
    }
}
