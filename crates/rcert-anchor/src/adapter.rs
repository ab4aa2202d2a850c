//! # Anchor Adapter Contract
//!
//! An anchor is an external ledger entry that cross-references a work
//! fingerprint. It is supplementary evidence only.
//!
//! ## Security Invariant
//!
//! Implementations are untrusted and may be slow. Callers reach them
//! through [`crate::GuardedAnchor`], which bounds every call with a timeout
//! and at most one retry.

use async_trait::async_trait;
use rcert_core::{ContentDigest, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::AnchorError;

/// A ledger entry for one fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorRecord {
    /// Ledger transaction reference.
    pub transaction_id: String,
    /// Block (or sequence) number containing the transaction.
    pub block_number: u64,
    /// Ledger network name.
    pub network_name: String,
    /// When the ledger recorded the entry.
    pub registered_at: Timestamp,
    /// The hash the ledger actually stores.
    pub anchored_hash: ContentDigest,
}

impl AnchorRecord {
    /// True when the ledger stores exactly `fingerprint`.
    pub fn matches(&self, fingerprint: &ContentDigest) -> bool {
        &self.anchored_hash == fingerprint
    }
}

/// External ledger collaborator.
#[async_trait]
pub trait AnchorAdapter: Send + Sync {
    /// Record `fingerprint` on the ledger. Eventually consistent: a later
    /// `lookup` may briefly return `None`.
    async fn anchor(&self, fingerprint: &ContentDigest) -> Result<AnchorRecord, AnchorError>;

    /// Find the record filed under `fingerprint`, if any.
    async fn lookup(&self, fingerprint: &ContentDigest) -> Result<Option<AnchorRecord>, AnchorError>;

    /// Ledger network name.
    fn network_name(&self) -> &str;
}
