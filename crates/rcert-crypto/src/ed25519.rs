//! # Ed25519 Keys and Signatures
//!
//! Thin newtypes over `ed25519-dalek` that tie signing and validation to
//! `CanonicalBytes`.
//!
//! ## Security Invariant
//!
//! - Signing input is `&CanonicalBytes`; raw byte slices cannot be signed.
//! - `SigningKey` does not implement `Serialize`, and its `Debug` output is
//!   redacted. The dalek key zeroizes itself on drop.
//! - Public keys and signatures serialize as lowercase hex strings so a
//!   certificate JSON can be verified by any third-party tool.

use ed25519_dalek::{Signer, Verifier};
use rcert_core::CanonicalBytes;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Ed25519 private key.
pub struct SigningKey(ed25519_dalek::SigningKey);

/// Ed25519 public key, published so third parties can verify certificates.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct VerifyingKey(ed25519_dalek::VerifyingKey);

/// A 64-byte Ed25519 signature.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519Signature(pub [u8; 64]);

// ─── SigningKey ──────────────────────────────────────────────────────────

impl SigningKey {
    /// Generate a key from the OS CSPRNG.
    pub fn generate() -> Self {
        Self(ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng))
    }

    /// Construct from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self(ed25519_dalek::SigningKey::from_bytes(seed))
    }

    /// Parse a 64-character hex seed. The decoded buffer is zeroized.
    pub fn from_seed_hex(hex: &str) -> Result<Self, CryptoError> {
        let bytes = Zeroizing::new(hex_to_bytes(hex.trim())?);
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidKey(format!(
                "seed must be 32 bytes (64 hex chars), got {} bytes",
                bytes.len()
            )));
        }
        let mut seed = Zeroizing::new([0u8; 32]);
        seed.copy_from_slice(&bytes);
        Ok(Self::from_seed(&seed))
    }

    /// The seed as hex, wrapped so the string is wiped after use.
    pub fn seed_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(bytes_to_hex(self.0.as_bytes()))
    }

    /// Derive the public key.
    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey(self.0.verifying_key())
    }

    /// Sign canonical bytes.
    pub fn sign(&self, data: &CanonicalBytes) -> Ed25519Signature {
        Ed25519Signature(self.0.sign(data.as_bytes()).to_bytes())
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

// ─── VerifyingKey ────────────────────────────────────────────────────────

impl VerifyingKey {
    /// Parse a 64-character hex public key.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let bytes = hex_to_bytes(hex.trim())?;
        let arr: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            CryptoError::InvalidKey(format!("public key must be 32 bytes, got {}", b.len()))
        })?;
        ed25519_dalek::VerifyingKey::from_bytes(&arr)
            .map(Self)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))
    }

    /// Raw 32-byte public key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    /// Lowercase hex.
    pub fn to_hex(&self) -> String {
        bytes_to_hex(self.0.as_bytes())
    }

    /// Stable short reference recorded on every certificate:
    /// `ed25519:` followed by the first 16 hex characters of the key.
    pub fn key_id(&self) -> String {
        let hex = self.to_hex();
        format!("ed25519:{}", &hex[..16])
    }

    /// Validate `signature` over `data`.
    pub fn verify(&self, data: &CanonicalBytes, signature: &Ed25519Signature) -> Result<(), CryptoError> {
        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
        self.0
            .verify_strict(data.as_bytes(), &sig)
            .map_err(|e| CryptoError::VerificationFailed(e.to_string()))
    }
}

impl std::fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VerifyingKey({})", self.key_id())
    }
}

impl std::fmt::Display for VerifyingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for VerifyingKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for VerifyingKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

// ─── Ed25519Signature ────────────────────────────────────────────────────

impl Ed25519Signature {
    /// Lowercase hex (128 characters).
    pub fn to_hex(&self) -> String {
        bytes_to_hex(&self.0)
    }

    /// Parse a 128-character hex signature.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let bytes = hex_to_bytes(hex.trim())?;
        let arr: [u8; 64] = bytes.try_into().map_err(|b: Vec<u8>| {
            CryptoError::VerificationFailed(format!("signature must be 64 bytes, got {}", b.len()))
        })?;
        Ok(Self(arr))
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519Signature({}...)", bytes_to_hex(&self.0[..4]))
    }
}

impl Serialize for Ed25519Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

// ─── Hex utilities ───────────────────────────────────────────────────────

/// Lowercase hex encoding.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decode a hex string (case-insensitive, even length).
pub fn hex_to_bytes(hex: &str) -> Result<Vec<u8>, CryptoError> {
    if hex.len() % 2 != 0 {
        return Err(CryptoError::HexDecode("hex string must have even length".to_string()));
    }
    if !hex.is_ascii() {
        return Err(CryptoError::HexDecode("hex string must be ASCII".to_string()));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| CryptoError::HexDecode(format!("position {i}: {e}")))
        })
        .collect()
}
