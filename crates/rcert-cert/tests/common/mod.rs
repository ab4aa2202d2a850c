//! Shared wiring for the engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use rcert_anchor::{AnchorGuardConfig, GuardedAnchor, InMemoryLedger};
use rcert_cert::{
    CertificateIssuer, InMemoryCertificateStore, InMemoryWorkRepository, OwnerOrAdminAuthz,
    RevocationManager, Verifier, Work, WorkDraft,
};
use rcert_core::Timestamp;
use rcert_crypto::LocalSigner;

pub struct Harness {
    pub store: Arc<InMemoryCertificateStore>,
    pub works: Arc<InMemoryWorkRepository>,
    pub ledger: Arc<InMemoryLedger>,
    pub signer: Arc<LocalSigner>,
    pub issuer: CertificateIssuer,
    pub verifier: Verifier,
    pub revoker: RevocationManager,
}

pub fn harness() -> Harness {
    let store = Arc::new(InMemoryCertificateStore::new());
    let works = Arc::new(InMemoryWorkRepository::new());
    let ledger = Arc::new(InMemoryLedger::new("local"));
    let signer = Arc::new(LocalSigner::from_seed(&[42u8; 32]));
    let guard = GuardedAnchor::new(
        ledger.clone(),
        AnchorGuardConfig {
            timeout: Duration::from_millis(100),
            retry_once: true,
        },
    );
    let issuer = CertificateIssuer::new(signer.clone(), store.clone(), works.clone())
        .with_anchor(guard.clone());
    let verifier = Verifier::new(store.clone(), works.clone(), signer.clone()).with_anchor(guard);
    let revoker = RevocationManager::new(
        store.clone(),
        works.clone(),
        Arc::new(OwnerOrAdminAuthz::new(["admin"])),
    );
    Harness {
        store,
        works,
        ledger,
        signer,
        issuer,
        verifier,
        revoker,
    }
}

impl Harness {
    pub fn register(&self, title: &str, content_hash: &str) -> Work {
        let work = WorkDraft {
            title: title.to_string(),
            work_type: "music".to_string(),
            category: "electronic".to_string(),
            owner_id: "artist-7".to_string(),
            owner_email: Some("artist@example.com".to_string()),
            content_hash: content_hash.to_string(),
            keywords: vec!["synthwave".to_string()],
        }
        .into_work(Timestamp::now())
        .expect("valid work");
        self.works.register(work.clone()).expect("register");
        work
    }
}
