//! # rcert-batch — Batch Verification
//!
//! Verifies up to [`BatchConfig::max_items`] identifiers on a bounded
//! worker pool and reports results in input order.
//!
//! ```text
//! start(ids) ─▶ BatchHandle ─┬─ snapshot() / summary()   poll
//!      │                     ├─ wait()                    until pending == 0
//!      │                     ├─ cancel()                  cooperative
//!      │                     └─ export_report()           only when complete
//!      └─▶ UnboundedReceiver<BatchEvent>                 progressive results
//! ```

pub mod error;
pub mod item;
pub mod orchestrator;
pub mod report;

pub use error::BatchError;
pub use item::{BatchItem, BatchSummary, ItemStatus};
pub use orchestrator::{
    BatchConfig, BatchEvent, BatchHandle, BatchOrchestrator, BatchSnapshot, BatchState,
};
pub use report::{BatchReport, ReportRow, REPORT_COLUMNS};
