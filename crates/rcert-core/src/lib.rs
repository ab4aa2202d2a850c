//! # rcert-core — Foundational Types
//!
//! Leaf crate of the rights-certificate workspace. Every other `rcert-*`
//! crate depends on it; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** Every byte sequence that is hashed or
//!    signed is produced by `CanonicalBytes::new()` (RFC 8785 JCS with float
//!    rejection). Fingerprints and certificate signatures cannot be computed
//!    over an ad-hoc `serde_json::to_vec()` output.
//!
//! 2. **`sha256_digest()` accepts only `&CanonicalBytes`.** The digest path is
//!    fixed at compile time.
//!
//! 3. **UTC-only, second-precision timestamps.** `Timestamp` renders as
//!    `YYYY-MM-DDTHH:MM:SSZ`, so the same instant always canonicalizes to the
//!    same bytes.
//!
//! 4. **Identifier newtypes.** `WorkId`, `CertificateId`, `BatchId` and
//!    `ActorId` cannot be confused with each other or with bare strings.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, sha256_hex, ContentDigest, DigestAlgorithm};
pub use error::{CanonicalizationError, ValidationError};
pub use identity::{ActorId, BatchId, CertificateId, WorkId};
pub use temporal::Timestamp;
