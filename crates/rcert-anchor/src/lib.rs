//! # rcert-anchor — Advisory Ledger Anchoring
//!
//! Work fingerprints may be cross-referenced on an external ledger. The
//! anchor is supplementary evidence: a missing, mismatched, or unreachable
//! anchor never turns a valid certificate into an invalid one.
//!
//! - [`AnchorAdapter`] — the collaborator contract (`anchor` / `lookup`).
//! - [`InMemoryLedger`] — local ledger with fault injection.
//! - [`HttpAnchorAdapter`] — reqwest client for an external service.
//! - [`GuardedAnchor`] — timeout plus single retry around any adapter.

pub mod adapter;
pub mod error;
pub mod guard;
pub mod http;
pub mod ledger;

pub use adapter::{AnchorAdapter, AnchorRecord};
pub use error::AnchorError;
pub use guard::{AnchorGuardConfig, GuardedAnchor};
pub use http::{HttpAnchorAdapter, HttpAnchorConfig};
pub use ledger::InMemoryLedger;
