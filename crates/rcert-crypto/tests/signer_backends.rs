//! Signer backends exercised through the trait objects the issuer holds.

use std::sync::Arc;

use rcert_core::CanonicalBytes;
use rcert_crypto::{
    CryptoError, EnvSigner, LocalSigner, PublishedKey, SignatureValidator, SignerService,
};

fn snapshot() -> CanonicalBytes {
    CanonicalBytes::new(&serde_json::json!({
        "title": "Neon Dreams",
        "certificateType": "standard",
        "certificateVersion": 1
    }))
    .expect("canonicalize")
}

#[test]
fn env_signer_matches_local_signer_for_same_seed() {
    let var = "RCERT_TEST_ENV_SIGNER_SEED";
    std::env::set_var(var, "2a".repeat(32));
    let env: Arc<dyn SignerService> = Arc::new(EnvSigner::from_env(var).expect("load"));
    let local: Arc<dyn SignerService> = Arc::new(LocalSigner::from_seed(&[0x2a; 32]));

    assert_eq!(env.key_id(), local.key_id());
    assert_eq!(env.provider_name(), "EnvSigner");

    let sig = env.sign(&snapshot()).expect("sign");
    local
        .validate(&snapshot(), &sig, env.key_id())
        .expect("same key validates");
    std::env::remove_var(var);
}

#[test]
fn env_signer_rejects_short_seed() {
    let var = "RCERT_TEST_ENV_SIGNER_SHORT";
    std::env::set_var(var, "abcd");
    let err = EnvSigner::from_env(var).unwrap_err();
    assert!(matches!(err, CryptoError::InvalidKey(_)));
    std::env::remove_var(var);
}

#[test]
fn third_party_validation_with_published_key_only() {
    let signer = LocalSigner::generate();
    let sig = signer.sign(&snapshot()).expect("sign");
    let hex = signer.verifying_key().to_hex();

    let validator: Box<dyn SignatureValidator> =
        Box::new(PublishedKey::from_hex(&hex).expect("parse"));
    validator
        .validate(&snapshot(), &sig, signer.key_id())
        .expect("valid");

    let other = CanonicalBytes::new(&serde_json::json!({"title": "Neon Dreamz"})).expect("c");
    assert!(matches!(
        validator.validate(&other, &sig, signer.key_id()),
        Err(CryptoError::VerificationFailed(_))
    ));
}
