//! # Cryptographic Error Types

use thiserror::Error;

/// Errors from signing, validation and key handling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Ed25519 signature validation failed.
    #[error("Ed25519 verification failed: {0}")]
    VerificationFailed(String),

    /// The certificate names a key this validator does not hold.
    #[error("unknown signing key: {0}")]
    UnknownKey(String),

    /// Malformed public or private key material.
    #[error("invalid key material: {0}")]
    InvalidKey(String),

    /// Hex decoding error.
    #[error("hex decode error: {0}")]
    HexDecode(String),

    /// The signing backend could not produce a signature.
    #[error("signing backend unavailable: {0}")]
    SigningUnavailable(String),
}
