//! # Anchor Guard — Timeout Plus Single Retry
//!
//! Every anchor call made by the issuer or verifier goes through
//! [`GuardedAnchor`]. Each attempt is bounded by `timeout`; a transient
//! failure (timeout or unavailable) is retried once when `retry_once` is
//! set. Rejections and malformed responses are not retried.
//!
//! Worst-case wall time for one guarded call is therefore `2 * timeout`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rcert_core::ContentDigest;

use crate::adapter::{AnchorAdapter, AnchorRecord};
use crate::error::AnchorError;

/// Budget for guarded calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorGuardConfig {
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Retry a transient failure once.
    pub retry_once: bool,
}

impl Default for AnchorGuardConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(2000),
            retry_once: true,
        }
    }
}

/// An [`AnchorAdapter`] wrapped in the timeout/retry budget.
#[derive(Clone)]
pub struct GuardedAnchor {
    inner: Arc<dyn AnchorAdapter>,
    config: AnchorGuardConfig,
}

impl std::fmt::Debug for GuardedAnchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedAnchor")
            .field("network", &self.inner.network_name())
            .field("config", &self.config)
            .finish()
    }
}

impl GuardedAnchor {
    /// Wrap `inner`.
    pub fn new(inner: Arc<dyn AnchorAdapter>, config: AnchorGuardConfig) -> Self {
        Self { inner, config }
    }

    /// Network name of the wrapped adapter.
    pub fn network_name(&self) -> &str {
        self.inner.network_name()
    }

    /// Guarded [`AnchorAdapter::anchor`].
    pub async fn anchor(&self, fingerprint: &ContentDigest) -> Result<AnchorRecord, AnchorError> {
        self.call("anchor", || self.inner.anchor(fingerprint)).await
    }

    /// Guarded [`AnchorAdapter::lookup`].
    pub async fn lookup(
        &self,
        fingerprint: &ContentDigest,
    ) -> Result<Option<AnchorRecord>, AnchorError> {
        self.call("lookup", || self.inner.lookup(fingerprint)).await
    }

    async fn call<T, F, Fut>(&self, op: &'static str, attempt: F) -> Result<T, AnchorError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, AnchorError>>,
    {
        let attempts = if self.config.retry_once { 2 } else { 1 };
        let mut last = None;
        for n in 1..=attempts {
            let result = match tokio::time::timeout(self.config.timeout, attempt()).await {
                Ok(r) => r,
                Err(_) => Err(AnchorError::Timeout {
                    network: self.inner.network_name().to_string(),
                    after_ms: self.config.timeout.as_millis() as u64,
                }),
            };
            match result {
                Ok(v) => return Ok(v),
                Err(e) if e.is_transient() && n < attempts => {
                    tracing::debug!(op, attempt = n, error = %e, "anchor call failed, retrying");
                    last = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        Err(last.unwrap_or_else(|| AnchorError::Unavailable {
            network: self.inner.network_name().to_string(),
            reason: "no attempt made".to_string(),
        }))
    }
}
