//! # Batch Verification Orchestrator
//!
//! Verifies an ordered list of identifiers on a fixed-size pool of Tokio
//! workers.
//!
//! - Workers claim indices from a shared cursor. Each index is claimed
//!   exactly once, either by a worker or by [`BatchHandle::cancel`].
//! - Results are written into a slot per input index, so reporting order
//!   is input order whatever the completion order.
//! - Items and summary live behind one mutex. Every resolution updates
//!   both under the same lock, so an observer never sees a torn summary.
//! - Progress is also pushed as [`BatchEvent`]s on an unbounded channel,
//!   emitted under the lock in resolution order.
//!
//! Cancellation is cooperative: workers stop claiming, unclaimed items
//! resolve at once as `NOT_VERIFIED / CANCELLED`, in-flight verifications
//! finish normally. `pending` still reaches zero.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rcert_cert::{VerificationResult, Verifier};
use rcert_core::{BatchId, Timestamp};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};

use crate::error::BatchError;
use crate::item::{BatchItem, BatchSummary, ItemStatus};
use crate::report::{BatchReport, ReportRow};

/// Worker pool sizing and input bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    pub concurrency: usize,
    pub max_items: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            max_items: 100,
        }
    }
}

impl BatchConfig {
    fn validate(&self, len: usize) -> Result<(), BatchError> {
        if self.concurrency == 0 {
            return Err(BatchError::InvalidInput(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if len == 0 {
            return Err(BatchError::InvalidInput(
                "batch must contain at least one identifier".to_string(),
            ));
        }
        if len > self.max_items {
            return Err(BatchError::InvalidInput(format!(
                "batch has {len} identifiers; the limit is {}",
                self.max_items
            )));
        }
        Ok(())
    }
}

/// Lifecycle of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchState {
    Running,
    Completed,
    Cancelled,
}

/// Progress notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum BatchEvent {
    /// One item resolved. `summary` is the state right after it.
    ItemResolved {
        batch_id: BatchId,
        item: BatchItem,
        summary: BatchSummary,
    },
    /// The last pending item resolved.
    Finished {
        batch_id: BatchId,
        state: BatchState,
        summary: BatchSummary,
    },
}

/// Point-in-time copy of a batch, items in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSnapshot {
    pub id: BatchId,
    pub state: BatchState,
    pub summary: BatchSummary,
    pub started_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<Timestamp>,
    pub items: Vec<BatchItem>,
}

struct Accumulator {
    items: Vec<BatchItem>,
    summary: BatchSummary,
    state: BatchState,
    finished_at: Option<Timestamp>,
}

struct Shared {
    id: BatchId,
    inputs: Vec<String>,
    started_at: Timestamp,
    cursor: AtomicUsize,
    cancelled: AtomicBool,
    acc: Mutex<Accumulator>,
    events: mpsc::UnboundedSender<BatchEvent>,
    done: watch::Sender<bool>,
}

impl Shared {
    /// Claim the next unscheduled index.
    fn claim(&self) -> Option<usize> {
        let idx = self.cursor.fetch_add(1, Ordering::SeqCst);
        (idx < self.inputs.len()).then_some(idx)
    }

    fn resolve(&self, idx: usize, apply: impl FnOnce(&mut BatchItem)) {
        let mut acc = self.acc.lock();
        let Some(item) = acc.items.get_mut(idx) else {
            return;
        };
        if item.status.is_resolved() {
            return;
        }
        apply(item);
        let status = item.status;
        let item = item.clone();
        acc.summary.record(status);
        let summary = acc.summary;
        // Receiver may be gone; progress is still visible via snapshots.
        let _ = self.events.send(BatchEvent::ItemResolved {
            batch_id: self.id,
            item,
            summary,
        });

        if summary.is_complete() {
            let state = if self.cancelled.load(Ordering::SeqCst) {
                BatchState::Cancelled
            } else {
                BatchState::Completed
            };
            acc.state = state;
            acc.finished_at = Some(Timestamp::now());
            let _ = self.events.send(BatchEvent::Finished {
                batch_id: self.id,
                state,
                summary,
            });
            self.done.send_replace(true);
            tracing::info!(
                batch_id = %self.id,
                state = ?state,
                total = summary.total,
                verified = summary.verified,
                not_verified = summary.not_verified,
                "batch finished"
            );
        }
    }

    fn snapshot(&self) -> BatchSnapshot {
        let acc = self.acc.lock();
        BatchSnapshot {
            id: self.id,
            state: acc.state,
            summary: acc.summary,
            started_at: self.started_at,
            finished_at: acc.finished_at,
            items: acc.items.clone(),
        }
    }
}

/// Starts batches against a [`Verifier`].
#[derive(Clone)]
pub struct BatchOrchestrator {
    verifier: Verifier,
    config: BatchConfig,
}

impl BatchOrchestrator {
    pub fn new(verifier: Verifier, config: BatchConfig) -> Self {
        Self { verifier, config }
    }

    pub fn config(&self) -> BatchConfig {
        self.config
    }

    /// Validate `ids` and spawn the worker pool on the current runtime.
    ///
    /// Returns immediately. Progress arrives on the returned receiver and
    /// through [`BatchHandle::snapshot`].
    pub fn start(
        &self,
        ids: Vec<String>,
    ) -> Result<(BatchHandle, mpsc::UnboundedReceiver<BatchEvent>), BatchError> {
        self.config.validate(ids.len())?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| BatchError::Scheduling(e.to_string()))?;

        let total = ids.len();
        let (events, rx) = mpsc::unbounded_channel();
        let (done, _) = watch::channel(false);
        let items = ids
            .iter()
            .enumerate()
            .map(|(i, input)| BatchItem::pending(i, input.clone()))
            .collect();
        let shared = Arc::new(Shared {
            id: BatchId::new(),
            inputs: ids,
            started_at: Timestamp::now(),
            cursor: AtomicUsize::new(0),
            cancelled: AtomicBool::new(false),
            acc: Mutex::new(Accumulator {
                items,
                summary: BatchSummary::new(total),
                state: BatchState::Running,
                finished_at: None,
            }),
            events,
            done,
        });

        let workers = self.config.concurrency.min(total);
        tracing::info!(batch_id = %shared.id, total, workers, "batch started");
        for _ in 0..workers {
            let shared = shared.clone();
            let verifier = self.verifier.clone();
            runtime.spawn(worker(shared, verifier));
        }

        Ok((BatchHandle { shared }, rx))
    }
}

async fn worker(shared: Arc<Shared>, verifier: Verifier) {
    while !shared.cancelled.load(Ordering::SeqCst) {
        let Some(idx) = shared.claim() else {
            break;
        };
        let input = &shared.inputs[idx];
        let result: VerificationResult = verifier.verify_str(input, Timestamp::now()).await;
        tracing::debug!(
            batch_id = %shared.id,
            index = idx,
            reason = %result.reason,
            "batch item resolved"
        );
        shared.resolve(idx, |item| item.resolve(result));
    }
}

/// Caller's view of a running or finished batch. Cheap to clone.
#[derive(Clone)]
pub struct BatchHandle {
    shared: Arc<Shared>,
}

impl BatchHandle {
    pub fn id(&self) -> BatchId {
        self.shared.id
    }

    pub fn summary(&self) -> BatchSummary {
        self.shared.acc.lock().summary
    }

    pub fn snapshot(&self) -> BatchSnapshot {
        self.shared.snapshot()
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::SeqCst)
    }

    /// No item is pending.
    pub fn is_finished(&self) -> bool {
        self.shared.acc.lock().summary.is_complete()
    }

    /// Stop scheduling. Unclaimed items resolve as cancelled before this
    /// returns; items already in flight complete on their own.
    pub fn cancel(&self) {
        if self.shared.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut cancelled = 0usize;
        while let Some(idx) = self.shared.claim() {
            self.shared.resolve(idx, BatchItem::cancel);
            cancelled += 1;
        }
        tracing::info!(batch_id = %self.shared.id, cancelled, "batch cancelled");
    }

    /// Wait until no item is pending.
    pub async fn wait(&self) -> BatchSnapshot {
        let mut rx = self.shared.done.subscribe();
        // The sender lives in `shared`, which this handle keeps alive.
        let _ = rx.wait_for(|done| *done).await;
        self.snapshot()
    }

    /// Rows in input order. Fails while any item is pending.
    pub fn export_report(&self) -> Result<BatchReport, BatchError> {
        let acc = self.shared.acc.lock();
        if !acc.summary.is_complete() {
            return Err(BatchError::ExportNotReady {
                batch_id: self.shared.id,
                pending: acc.summary.pending,
            });
        }
        debug_assert!(acc.items.iter().all(|i| i.status != ItemStatus::Pending));
        Ok(BatchReport {
            batch_id: self.shared.id,
            summary: acc.summary,
            cancelled: acc.state == BatchState::Cancelled,
            generated_at: Timestamp::now(),
            rows: acc.items.iter().map(ReportRow::from_item).collect(),
        })
    }
}

impl std::fmt::Debug for BatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchHandle")
            .field("id", &self.shared.id)
            .field("summary", &self.summary())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_bounds() {
        let cfg = BatchConfig::default();
        assert!(cfg.validate(1).is_ok());
        assert!(cfg.validate(100).is_ok());
        assert!(matches!(cfg.validate(101), Err(BatchError::InvalidInput(_))));
        assert!(matches!(cfg.validate(0), Err(BatchError::InvalidInput(_))));
        let zero = BatchConfig {
            concurrency: 0,
            ..cfg
        };
        assert!(matches!(zero.validate(5), Err(BatchError::InvalidInput(_))));
    }
}
