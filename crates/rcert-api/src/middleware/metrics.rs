//! # Request Metrics
//!
//! In-process counters, served as JSON by `GET /metrics`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use rcert_cert::ReasonCode;
use serde::Serialize;

#[derive(Debug, Default)]
struct Counters {
    requests: AtomicU64,
    errors: AtomicU64,
    verifications: AtomicU64,
    verified: AtomicU64,
    issued: AtomicU64,
    revoked: AtomicU64,
    batches: AtomicU64,
}

/// Shared counters. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct ApiMetrics {
    inner: Arc<Counters>,
}

/// Point-in-time copy of every counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub errors: u64,
    pub verifications: u64,
    pub verified: u64,
    pub certificates_issued: u64,
    pub certificates_revoked: u64,
    pub batches_started: u64,
}

impl ApiMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> u64 {
        self.inner.requests.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.inner.errors.load(Ordering::Relaxed)
    }

    pub fn record_verification(&self, reason: ReasonCode) {
        self.inner.verifications.fetch_add(1, Ordering::Relaxed);
        if reason == ReasonCode::Verified {
            self.inner.verified.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_issued(&self) {
        self.inner.issued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_revoked(&self) {
        self.inner.revoked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_batch(&self) {
        self.inner.batches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let c = &self.inner;
        MetricsSnapshot {
            requests: c.requests.load(Ordering::Relaxed),
            errors: c.errors.load(Ordering::Relaxed),
            verifications: c.verifications.load(Ordering::Relaxed),
            verified: c.verified.load(Ordering::Relaxed),
            certificates_issued: c.issued.load(Ordering::Relaxed),
            certificates_revoked: c.revoked.load(Ordering::Relaxed),
            batches_started: c.batches.load(Ordering::Relaxed),
        }
    }
}

/// Count every request, and every 4xx/5xx response as an error.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();

    let response = next.run(request).await;

    if let Some(m) = metrics {
        m.inner.requests.fetch_add(1, Ordering::Relaxed);
        if response.status().is_server_error() || response.status().is_client_error() {
            m.inner.errors.fetch_add(1, Ordering::Relaxed);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_counters() {
        let m = ApiMetrics::new();
        m.record_verification(ReasonCode::Verified);
        m.record_verification(ReasonCode::Revoked);
        let s = m.snapshot();
        assert_eq!((s.verifications, s.verified), (2, 1));
    }
}
