//! Subcommand handlers against files on disk.

use std::path::Path;
use std::sync::Arc;

use rcert_cert::{
    fingerprint, Certificate, CertificateIssuer, CertificateType, InMemoryCertificateStore,
    InMemoryWorkRepository, IssuancePolicy, Work, WorkDraft,
};
use rcert_cli::fingerprint::{run_fingerprint, FingerprintArgs};
use rcert_cli::keygen::{run_keygen, KeygenArgs};
use rcert_cli::verify::{run_verify, VerifyArgs};
use rcert_cli::EXIT_NOT_VERIFIED;
use rcert_core::Timestamp;
use rcert_crypto::{LocalSigner, SigningKey};

fn draft() -> WorkDraft {
    WorkDraft {
        title: "Neon Dreams".into(),
        work_type: "music".into(),
        category: "electronic".into(),
        owner_id: "artist-7".into(),
        owner_email: Some("artist@example.com".into()),
        content_hash: "0xAAA".into(),
        keywords: vec!["synthwave".into()],
    }
}

fn issue(seed: [u8; 32], ty: CertificateType) -> (Work, Certificate) {
    let works = Arc::new(InMemoryWorkRepository::new());
    let store = Arc::new(InMemoryCertificateStore::new());
    let signer = Arc::new(LocalSigner::from_seed(&seed));
    let work = draft().into_work(Timestamp::now()).unwrap();
    works.register(work.clone()).unwrap();
    let issuer = CertificateIssuer::new(signer, store, works);
    let cert = issuer.issue(&work, ty, &IssuancePolicy::default()).unwrap();
    (work, cert)
}

fn write_json(dir: &Path, name: &str, value: &impl serde::Serialize) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

fn public_key(seed: [u8; 32]) -> String {
    SigningKey::from_seed(&seed).verifying_key().to_hex()
}

#[test]
fn keygen_prints_usable_seed() {
    let mut out = Vec::new();
    let code = run_keygen(&KeygenArgs { seed_only: true }, &mut out).unwrap();
    assert_eq!(code, 0);
    let seed = String::from_utf8(out).unwrap();
    let seed = seed.trim();
    assert_eq!(seed.len(), 64);
    assert!(SigningKey::from_seed_hex(seed).is_ok());

    let mut out = Vec::new();
    run_keygen(&KeygenArgs { seed_only: false }, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("public key:"));
    assert!(text.contains("key id:     ed25519:"));
}

#[test]
fn fingerprint_accepts_work_and_draft() {
    let dir = tempfile::tempdir().unwrap();
    let work = draft().into_work(Timestamp::now()).unwrap();
    let expected = fingerprint(&work).unwrap().to_hex();

    for path in [
        write_json(dir.path(), "work.json", &work),
        write_json(dir.path(), "draft.json", &draft()),
    ] {
        let mut out = Vec::new();
        let code = run_fingerprint(&FingerprintArgs { work: path }, &mut out).unwrap();
        assert_eq!(code, 0);
        assert_eq!(String::from_utf8(out).unwrap().trim(), expected);
    }
}

#[test]
fn fingerprint_rejects_invalid_work() {
    let dir = tempfile::tempdir().unwrap();
    let mut bad = draft();
    bad.content_hash = "zzz".into();
    let path = write_json(dir.path(), "bad.json", &bad);
    assert!(run_fingerprint(&FingerprintArgs { work: path }, &mut Vec::new()).is_err());

    let missing = dir.path().join("missing.json");
    assert!(run_fingerprint(&FingerprintArgs { work: missing }, &mut Vec::new()).is_err());
}

#[test]
fn verify_exit_codes() {
    let dir = tempfile::tempdir().unwrap();
    let seed = [5u8; 32];
    let (_, cert) = issue(seed, CertificateType::Standard);
    let path = write_json(dir.path(), "cert.json", &cert);

    let args = |key: String, at: Option<&str>| VerifyArgs {
        certificate: path.clone(),
        public_key: key,
        at: at.map(str::to_string),
    };

    let mut out = Vec::new();
    assert_eq!(run_verify(&args(public_key(seed), None), &mut out).unwrap(), 0);
    let body: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(body["reason"], "VERIFIED");

    let mut out = Vec::new();
    let code = run_verify(&args(public_key([6u8; 32]), None), &mut out).unwrap();
    assert_eq!(code, EXIT_NOT_VERIFIED);
    let body: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(body["reason"], "SIGNATURE_INVALID");

    let mut out = Vec::new();
    let code = run_verify(&args(public_key(seed), Some("2099-01-01T00:00:00Z")), &mut out).unwrap();
    assert_eq!(code, EXIT_NOT_VERIFIED);
    let body: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(body["reason"], "EXPIRED");
}

#[test]
fn verify_detects_tampered_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let seed = [5u8; 32];
    let (_, mut cert) = issue(seed, CertificateType::Premium);
    cert.metadata_snapshot = cert.metadata_snapshot.replace("Neon Dreams", "Neon Dreamz");
    let path = write_json(dir.path(), "cert.json", &cert);

    let mut out = Vec::new();
    let code = run_verify(
        &VerifyArgs {
            certificate: path,
            public_key: public_key(seed),
            at: None,
        },
        &mut out,
    )
    .unwrap();
    assert_eq!(code, EXIT_NOT_VERIFIED);
    let body: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(body["verified"], false);
}

#[test]
fn verify_rejects_malformed_key() {
    let dir = tempfile::tempdir().unwrap();
    let (_, cert) = issue([5u8; 32], CertificateType::Standard);
    let path = write_json(dir.path(), "cert.json", &cert);
    let result = run_verify(
        &VerifyArgs {
            certificate: path,
            public_key: "not-hex".into(),
            at: None,
        },
        &mut Vec::new(),
    );
    assert!(result.is_err());
}
