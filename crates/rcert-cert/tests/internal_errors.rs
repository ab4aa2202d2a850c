//! Store faults inside verification fold into `INTERNAL_ERROR`.

mod common;

use std::sync::Arc;

use common::harness;
use rcert_cert::{
    Certificate, CertificateLocator, CertificateStore, CertificateType, InMemoryCertificateStore,
    IssuancePolicy, ReasonCode, RevocationOutcome, StoreError, Verifier,
};
use rcert_core::{CertificateId, Timestamp, WorkId};

#[derive(Clone, Copy)]
enum Fault {
    Backend,
    Panic,
}

/// Delegates to an in-memory store except for one poisoned id.
struct FaultyStore {
    inner: Arc<InMemoryCertificateStore>,
    poisoned: CertificateId,
    fault: Fault,
}

impl CertificateStore for FaultyStore {
    fn get(&self, id: &CertificateId) -> Result<Option<Certificate>, StoreError> {
        if *id == self.poisoned {
            match self.fault {
                Fault::Backend => return Err(StoreError::Backend("connection reset".into())),
                Fault::Panic => panic!("store driver crashed"),
            }
        }
        self.inner.get(id)
    }

    fn latest_for_work(&self, work_id: &WorkId) -> Result<Option<Certificate>, StoreError> {
        self.inner.latest_for_work(work_id)
    }

    fn insert_unique_active(&self, cert: Certificate, now: Timestamp) -> Result<(), StoreError> {
        self.inner.insert_unique_active(cert, now)
    }

    fn revoke(&self, id: &CertificateId, at: Timestamp) -> Result<RevocationOutcome, StoreError> {
        self.inner.revoke(id, at)
    }
}

async fn verify_with_fault(fault: Fault) {
    let h = harness();
    let policy = IssuancePolicy::default();
    let healthy = h
        .issuer
        .issue(&h.register("Healthy", "0x01"), CertificateType::Standard, &policy)
        .expect("issue");
    let broken = h
        .issuer
        .issue(&h.register("Broken", "0x02"), CertificateType::Standard, &policy)
        .expect("issue");

    let store = Arc::new(FaultyStore {
        inner: h.store.clone(),
        poisoned: broken.id,
        fault,
    });
    let verifier = Verifier::new(store, h.works.clone(), h.signer.clone());

    let r = verifier.verify(&CertificateLocator::Id(broken.id)).await;
    assert!(!r.verified);
    assert_eq!(r.reason, ReasonCode::InternalError);

    let r = verifier.verify(&CertificateLocator::Id(healthy.id)).await;
    assert!(r.verified, "{r:?}");
}

#[tokio::test]
async fn backend_error_is_internal_error() {
    verify_with_fault(Fault::Backend).await;
}

#[tokio::test]
async fn panicking_store_is_internal_error() {
    verify_with_fault(Fault::Panic).await;
}
