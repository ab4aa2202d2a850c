//! The anchor is advisory: whatever the ledger says, a valid certificate
//! stays verified.

mod common;

use std::time::Duration;

use common::harness;
use rcert_anchor::AnchorRecord;
use rcert_cert::{
    fingerprint, AnchorCrossCheck, CertificateLocator, CertificateType, IssuancePolicy,
    ReasonCode, WorkRepository,
};
use rcert_core::{sha256_digest, CanonicalBytes, Timestamp};

fn no_anchor() -> IssuancePolicy {
    IssuancePolicy {
        anchor_on_issue: false,
        ..IssuancePolicy::default()
    }
}

#[tokio::test]
async fn issuance_anchors_in_background_and_attaches_to_work() {
    let h = harness();
    let work = h.register("Neon Dreams", "0xAAA");
    let cert = h
        .issuer
        .issue(&work, CertificateType::Standard, &IssuancePolicy::default())
        .expect("issue");

    let mut attached = None;
    for _ in 0..50 {
        attached = h.works.anchor_for(&work.id).expect("repo");
        if attached.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let record = attached.expect("anchor attached");
    assert_eq!(record.anchored_hash, fingerprint(&work).expect("fp"));
    assert_eq!(record.network_name, "local");

    let r = h.verifier.verify(&CertificateLocator::Id(cert.id)).await;
    assert!(r.verified);
    assert_eq!(r.anchor_cross_check, AnchorCrossCheck::Match);
    assert_eq!(r.anchor.expect("record").transaction_id, record.transaction_id);
}

#[tokio::test]
async fn slow_ledger_does_not_block_issuance() {
    let h = harness();
    h.ledger.set_latency(Some(Duration::from_secs(30)));
    let work = h.register("Neon Dreams", "0xAAA");
    let started = std::time::Instant::now();
    h.issuer
        .issue(&work, CertificateType::Standard, &IssuancePolicy::default())
        .expect("issue");
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn absent_anchor_still_verifies() {
    let h = harness();
    let work = h.register("Neon Dreams", "0xAAA");
    let cert = h
        .issuer
        .issue(&work, CertificateType::Standard, &no_anchor())
        .expect("issue");
    let r = h.verifier.verify(&CertificateLocator::Id(cert.id)).await;
    assert!(r.verified);
    assert_eq!(r.anchor_cross_check, AnchorCrossCheck::Absent);
}

#[tokio::test]
async fn mismatched_anchor_is_reported_not_failed() {
    let h = harness();
    let work = h.register("Neon Dreams", "0xAAA");
    let cert = h
        .issuer
        .issue(&work, CertificateType::Standard, &no_anchor())
        .expect("issue");

    let fp = fingerprint(&work).expect("fp");
    let other = sha256_digest(&CanonicalBytes::new(&serde_json::json!({"other": 1})).expect("c"));
    h.ledger.insert_record(
        fp,
        AnchorRecord {
            transaction_id: "local-tx-forged".to_string(),
            block_number: 9,
            network_name: "local".to_string(),
            registered_at: Timestamp::now(),
            anchored_hash: other,
        },
    );

    let r = h.verifier.verify(&CertificateLocator::Id(cert.id)).await;
    assert!(r.verified, "mismatch must not flip verified");
    assert_eq!(r.reason, ReasonCode::Verified);
    assert_eq!(r.anchor_cross_check, AnchorCrossCheck::Mismatch);
}

#[tokio::test]
async fn unreachable_ledger_is_unavailable() {
    let h = harness();
    let work = h.register("Neon Dreams", "0xAAA");
    let cert = h
        .issuer
        .issue(&work, CertificateType::Standard, &no_anchor())
        .expect("issue");

    h.ledger.fail_next(10);
    let r = h.verifier.verify(&CertificateLocator::Id(cert.id)).await;
    assert!(r.verified);
    assert_eq!(r.anchor_cross_check, AnchorCrossCheck::Unavailable);
}

#[tokio::test]
async fn timed_out_ledger_is_unavailable_within_budget() {
    let h = harness();
    let work = h.register("Neon Dreams", "0xAAA");
    let cert = h
        .issuer
        .issue(&work, CertificateType::Standard, &no_anchor())
        .expect("issue");

    h.ledger.set_latency(Some(Duration::from_secs(30)));
    let started = std::time::Instant::now();
    let r = h.verifier.verify(&CertificateLocator::Id(cert.id)).await;
    // Two attempts of 100ms each, plus scheduling slack.
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(r.verified);
    assert_eq!(r.anchor_cross_check, AnchorCrossCheck::Unavailable);
}

#[tokio::test]
async fn failed_certificates_skip_the_ledger() {
    let h = harness();
    let work = h.register("Neon Dreams", "0xAAA");
    let cert = h
        .issuer
        .issue(&work, CertificateType::Standard, &no_anchor())
        .expect("issue");
    h.revoker
        .revoke(&cert.id, &rcert_core::ActorId::new("artist-7").expect("actor"))
        .expect("revoke");

    let calls_before = h.ledger.call_count();
    let r = h.verifier.verify(&CertificateLocator::Id(cert.id)).await;
    assert_eq!(r.reason, ReasonCode::Revoked);
    assert_eq!(r.anchor_cross_check, AnchorCrossCheck::Skipped);
    assert_eq!(h.ledger.call_count(), calls_before);
}
