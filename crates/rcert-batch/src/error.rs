use rcert_core::BatchId;
use thiserror::Error;

/// Batch-level failures. Per-item failures never surface here; they are
/// recorded on the item.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// Rejected before any work was scheduled.
    #[error("invalid batch: {0}")]
    InvalidInput(String),

    /// Export requested while items are still pending.
    #[error("batch {batch_id} has {pending} pending item(s); export is not ready")]
    ExportNotReady { batch_id: BatchId, pending: usize },

    /// The worker pool could not be started.
    #[error("batch scheduling failed: {0}")]
    Scheduling(String),
}
