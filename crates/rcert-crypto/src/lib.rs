//! # rcert-crypto — Certificate Signing
//!
//! Ed25519 key types and the [`SignerService`] / [`SignatureValidator`]
//! abstraction the issuer and verifier are built on.
//!
//! Signing input is always `&CanonicalBytes`. A certificate's signature is
//! computed over the canonical form of its metadata snapshot, so anyone
//! holding the published public key can re-canonicalize the snapshot and
//! check the signature without contacting the issuer.

pub mod ed25519;
pub mod error;
pub mod signer;

pub use ed25519::{bytes_to_hex, hex_to_bytes, Ed25519Signature, SigningKey, VerifyingKey};
pub use error::CryptoError;
pub use signer::{EnvSigner, LocalSigner, PublishedKey, SignatureValidator, SignerService};
