//! # Signer Service
//!
//! Two traits split the trust boundary:
//!
//! - [`SignatureValidator`] — anything that can check a signature for a
//!   given key id. Third parties holding only the published public key use
//!   [`PublishedKey`].
//! - [`SignerService`] — a validator that also holds private key material
//!   and can sign. Constructed once at startup and injected into the issuer
//!   and verifier; there is no process-global key.
//!
//! Backends:
//!
//! - [`LocalSigner`]: in-memory key, for development and tests.
//! - [`EnvSigner`]: 32-byte seed loaded from a hex environment variable,
//!   for container deployments where secrets arrive through the environment.

use rcert_core::CanonicalBytes;

use crate::ed25519::{Ed25519Signature, SigningKey, VerifyingKey};
use crate::error::CryptoError;

/// Validates signatures against a key reference.
pub trait SignatureValidator: Send + Sync {
    /// Validate `signature` over `data`, made by the key named `key_id`.
    ///
    /// Returns `CryptoError::UnknownKey` when `key_id` is not held.
    fn validate(
        &self,
        data: &CanonicalBytes,
        signature: &Ed25519Signature,
        key_id: &str,
    ) -> Result<(), CryptoError>;
}

/// Holds signing key material and produces signatures.
pub trait SignerService: SignatureValidator {
    /// Key reference recorded on every certificate this signer produces.
    fn key_id(&self) -> &str;

    /// Sign canonical bytes.
    fn sign(&self, data: &CanonicalBytes) -> Result<Ed25519Signature, CryptoError>;

    /// Public half, for publication.
    fn verifying_key(&self) -> VerifyingKey;

    /// Backend name for diagnostics.
    fn provider_name(&self) -> &str;
}

fn validate_with(
    vk: &VerifyingKey,
    expected_id: &str,
    data: &CanonicalBytes,
    signature: &Ed25519Signature,
    key_id: &str,
) -> Result<(), CryptoError> {
    if key_id != expected_id {
        return Err(CryptoError::UnknownKey(key_id.to_string()));
    }
    vk.verify(data, signature)
}

// ─── PublishedKey ────────────────────────────────────────────────────────

/// Validation-only view of a signer's public key.
#[derive(Debug, Clone)]
pub struct PublishedKey {
    key: VerifyingKey,
    key_id: String,
}

impl PublishedKey {
    /// Wrap a public key.
    pub fn new(key: VerifyingKey) -> Self {
        let key_id = key.key_id();
        Self { key, key_id }
    }

    /// Parse from hex.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        VerifyingKey::from_hex(hex).map(Self::new)
    }

    /// The key id certificates signed by this key carry.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }
}

impl SignatureValidator for PublishedKey {
    fn validate(
        &self,
        data: &CanonicalBytes,
        signature: &Ed25519Signature,
        key_id: &str,
    ) -> Result<(), CryptoError> {
        validate_with(&self.key, &self.key_id, data, signature, key_id)
    }
}

// ─── LocalSigner ─────────────────────────────────────────────────────────

/// In-memory signer.
pub struct LocalSigner {
    key: SigningKey,
    public: VerifyingKey,
    key_id: String,
}

impl LocalSigner {
    /// Wrap an existing signing key.
    pub fn new(key: SigningKey) -> Self {
        let public = key.verifying_key();
        let key_id = public.key_id();
        Self { key, public, key_id }
    }

    /// Fresh random key.
    pub fn generate() -> Self {
        Self::new(SigningKey::generate())
    }

    /// Deterministic key from a seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self::new(SigningKey::from_seed(seed))
    }
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSigner")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

impl SignatureValidator for LocalSigner {
    fn validate(
        &self,
        data: &CanonicalBytes,
        signature: &Ed25519Signature,
        key_id: &str,
    ) -> Result<(), CryptoError> {
        validate_with(&self.public, &self.key_id, data, signature, key_id)
    }
}

impl SignerService for LocalSigner {
    fn key_id(&self) -> &str {
        &self.key_id
    }

    fn sign(&self, data: &CanonicalBytes) -> Result<Ed25519Signature, CryptoError> {
        Ok(self.key.sign(data))
    }

    fn verifying_key(&self) -> VerifyingKey {
        self.public
    }

    fn provider_name(&self) -> &str {
        "LocalSigner"
    }
}

// ─── EnvSigner ───────────────────────────────────────────────────────────

/// Signer whose seed comes from an environment variable.
///
/// ```bash
/// export RCERT_SIGNING_KEY_HEX="9d61b19d..."  # 64 hex chars
/// ```
pub struct EnvSigner {
    inner: LocalSigner,
    var_name: String,
}

impl EnvSigner {
    /// Load the seed from `var_name`.
    ///
    /// Returns `SigningUnavailable` if the variable is unset and
    /// `InvalidKey`/`HexDecode` if its value is malformed.
    pub fn from_env(var_name: &str) -> Result<Self, CryptoError> {
        let hex = std::env::var(var_name).map_err(|_| {
            CryptoError::SigningUnavailable(format!("environment variable {var_name} not set"))
        })?;
        let hex = zeroize::Zeroizing::new(hex);
        let key = SigningKey::from_seed_hex(&hex)?;
        tracing::info!(var = var_name, "loaded signing key from environment");
        Ok(Self {
            inner: LocalSigner::new(key),
            var_name: var_name.to_string(),
        })
    }

    /// Variable this signer was loaded from.
    pub fn var_name(&self) -> &str {
        &self.var_name
    }
}

impl std::fmt::Debug for EnvSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvSigner")
            .field("var_name", &self.var_name)
            .field("key_id", &self.inner.key_id)
            .finish_non_exhaustive()
    }
}

impl SignatureValidator for EnvSigner {
    fn validate(
        &self,
        data: &CanonicalBytes,
        signature: &Ed25519Signature,
        key_id: &str,
    ) -> Result<(), CryptoError> {
        self.inner.validate(data, signature, key_id)
    }
}

impl SignerService for EnvSigner {
    fn key_id(&self) -> &str {
        self.inner.key_id()
    }

    fn sign(&self, data: &CanonicalBytes) -> Result<Ed25519Signature, CryptoError> {
        self.inner.sign(data)
    }

    fn verifying_key(&self) -> VerifyingKey {
        self.inner.verifying_key()
    }

    fn provider_name(&self) -> &str {
        "EnvSigner"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> CanonicalBytes {
        CanonicalBytes::new(&serde_json::json!({"workId": "w-1", "certificateVersion": 1})).unwrap()
    }

    #[test]
    fn local_signer_roundtrip() {
        let signer = LocalSigner::generate();
        let sig = signer.sign(&data()).unwrap();
        signer.validate(&data(), &sig, signer.key_id()).unwrap();
        assert_eq!(signer.provider_name(), "LocalSigner");
    }

    #[test]
    fn unknown_key_id_is_rejected_before_crypto() {
        let signer = LocalSigner::generate();
        let sig = signer.sign(&data()).unwrap();
        let err = signer.validate(&data(), &sig, "ed25519:0000000000000000").unwrap_err();
        assert!(matches!(err, CryptoError::UnknownKey(_)));
    }

    #[test]
    fn published_key_validates_signer_output() {
        let signer = LocalSigner::from_seed(&[3u8; 32]);
        let published = PublishedKey::from_hex(&signer.verifying_key().to_hex()).unwrap();
        assert_eq!(published.key_id(), signer.key_id());
        let sig = signer.sign(&data()).unwrap();
        published.validate(&data(), &sig, signer.key_id()).unwrap();
    }

    #[test]
    fn debug_does_not_leak_seed() {
        let signer = LocalSigner::from_seed(&[0xab; 32]);
        let dbg = format!("{signer:?}");
        assert!(dbg.contains("key_id"));
        assert!(!dbg.contains("abababab"));
    }

    #[test]
    fn env_signer_missing_var() {
        let err = EnvSigner::from_env("RCERT_TEST_SIGNER_DEFINITELY_UNSET").unwrap_err();
        assert!(matches!(err, CryptoError::SigningUnavailable(_)));
    }
}
