//! # rcert-cert — Certificate Issuance and Verification
//!
//! Turns a registered [`Work`] into a signed, independently verifiable
//! [`Certificate`], tracks its revocation and expiry, and evaluates its
//! trust state.
//!
//! ## Components
//!
//! - [`fingerprint()`] — deterministic digest of a work's metadata.
//! - [`CertificateIssuer`] — builds, signs and stores certificates.
//! - [`RevocationManager`] — one-way terminal revocation.
//! - [`Verifier`] / [`evaluate_certificate()`] — fail-closed status engine.
//! - [`PublicVerification`] — redacted projection for untrusted callers.
//!
//! ## Data flow
//!
//! ```text
//! Work ─▶ fingerprint ─▶ MetadataSnapshot ─▶ sign ─▶ Certificate ─▶ CertificateStore
//!                                                                     │
//!             RevocationManager ──(isRevoked)─────────────────────────┤
//!                                                                     ▼
//!                                   Verifier ─▶ VerificationResult ─▶ PublicVerification
//! ```
//!
//! Signer, stores, authorization and anchor are injected as trait objects.

pub mod certificate;
pub mod error;
pub mod fingerprint;
pub mod issuer;
pub mod locator;
pub mod public;
pub mod revocation;
pub mod store;
pub mod verifier;
pub mod work;

pub use certificate::{
    Certificate, CertificateStatus, CertificateType, MetadataSnapshot, CERTIFICATE_VERSION,
};
pub use error::CertError;
pub use fingerprint::fingerprint;
pub use issuer::{CertificateIssuer, IssuancePolicy};
pub use locator::{normalize_content_hash, CertificateLocator};
pub use public::{http_status, DisclosurePolicy, PublicVerification, UNIFIED_MESSAGE};
pub use revocation::{AuthzService, OwnerOrAdminAuthz, RevocationManager};
pub use store::{
    CertificateStore, InMemoryCertificateStore, InMemoryWorkRepository, RevocationOutcome,
    StoreError, WorkRepository,
};
pub use verifier::{
    evaluate_certificate, AnchorCrossCheck, CertificateView, ReasonCode, VerificationResult,
    Verifier,
};
pub use work::{Work, WorkDraft};
