//! # In-Memory Ledger
//!
//! Local stand-in for an anchoring service. Block numbers increase
//! monotonically from 1 and transaction ids are derived from the
//! fingerprint, so repeated runs produce the same references.
//!
//! Provides NO external finality; suitable for development, tests, and
//! deployments where `RCERT_ANCHOR_URL` is unset. Fault-injection knobs
//! (latency, transient failures, forged records) let tests drive the
//! verifier's degraded paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use rcert_core::{ContentDigest, Timestamp};

use crate::adapter::{AnchorAdapter, AnchorRecord};
use crate::error::AnchorError;

/// In-process ledger.
#[derive(Debug)]
pub struct InMemoryLedger {
    network_name: String,
    next_block: AtomicU64,
    records: RwLock<HashMap<ContentDigest, AnchorRecord>>,
    latency: RwLock<Option<Duration>>,
    fail_next: AtomicU32,
    calls: AtomicU64,
}

impl InMemoryLedger {
    /// Create an empty ledger for `network_name`.
    pub fn new(network_name: impl Into<String>) -> Self {
        Self {
            network_name: network_name.into(),
            next_block: AtomicU64::new(1),
            records: RwLock::new(HashMap::new()),
            latency: RwLock::new(None),
            fail_next: AtomicU32::new(0),
            calls: AtomicU64::new(0),
        }
    }

    /// Delay every call by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.write() = latency;
    }

    /// Fail the next `n` calls with `Unavailable`.
    pub fn fail_next(&self, n: u32) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// File `record` under `fingerprint` regardless of its `anchored_hash`.
    pub fn insert_record(&self, fingerprint: ContentDigest, record: AnchorRecord) {
        self.records.write().insert(fingerprint, record);
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// True when no record is held.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Total adapter calls, including failed ones.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> Result<(), AnchorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let latency = *self.latency.read();
        if let Some(d) = latency {
            tokio::time::sleep(d).await;
        }
        let injected = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(AnchorError::Unavailable {
                network: self.network_name.clone(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AnchorAdapter for InMemoryLedger {
    async fn anchor(&self, fingerprint: &ContentDigest) -> Result<AnchorRecord, AnchorError> {
        self.enter().await?;
        let mut records = self.records.write();
        if let Some(existing) = records.get(fingerprint) {
            return Ok(existing.clone());
        }
        let block = self.next_block.fetch_add(1, Ordering::SeqCst);
        let hex = fingerprint.to_hex();
        let record = AnchorRecord {
            transaction_id: format!("local-tx-{}", hex.get(..16).unwrap_or("unknown")),
            block_number: block,
            network_name: self.network_name.clone(),
            registered_at: Timestamp::now(),
            anchored_hash: fingerprint.clone(),
        };
        records.insert(fingerprint.clone(), record.clone());
        Ok(record)
    }

    async fn lookup(&self, fingerprint: &ContentDigest) -> Result<Option<AnchorRecord>, AnchorError> {
        self.enter().await?;
        Ok(self.records.read().get(fingerprint).cloned())
    }

    fn network_name(&self) -> &str {
        &self.network_name
    }
}
