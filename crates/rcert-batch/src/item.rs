//! Per-item status and the batch summary.

use rcert_cert::{ReasonCode, VerificationResult};
use serde::{Deserialize, Serialize};

/// Resolution state of one batch item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    Pending,
    Verified,
    NotVerified,
    /// The identifier was malformed or the verification itself failed.
    Error,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Verified => "VERIFIED",
            Self::NotVerified => "NOT_VERIFIED",
            Self::Error => "ERROR",
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One input identifier and, once resolved, its verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    /// Position in the caller's input.
    pub index: usize,
    pub input: String,
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<ReasonCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<VerificationResult>,
}

impl BatchItem {
    pub(crate) fn pending(index: usize, input: String) -> Self {
        Self {
            index,
            input,
            status: ItemStatus::Pending,
            reason: None,
            message: None,
            result: None,
        }
    }

    /// Fold a verifier result into the item. An internal failure of the
    /// verification is reported as `ERROR` for this item only.
    pub(crate) fn resolve(&mut self, mut result: VerificationResult) {
        let status = if result.verified {
            ItemStatus::Verified
        } else {
            match result.reason {
                ReasonCode::InvalidInput => ItemStatus::Error,
                ReasonCode::InternalError | ReasonCode::Error => {
                    result.reason = ReasonCode::Error;
                    ItemStatus::Error
                }
                _ => ItemStatus::NotVerified,
            }
        };
        self.status = status;
        self.reason = Some(result.reason);
        self.message = Some(result.message.clone());
        self.result = Some(result);
    }

    pub(crate) fn cancel(&mut self) {
        self.status = ItemStatus::NotVerified;
        self.reason = Some(ReasonCode::Cancelled);
        self.message = Some(ReasonCode::Cancelled.default_message().to_string());
    }
}

/// Progress counters.
///
/// `verified + not_verified + pending == total` holds for every value
/// handed out by the orchestrator. Items resolved as `ERROR` count towards
/// `not_verified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total: usize,
    pub verified: usize,
    pub not_verified: usize,
    pub pending: usize,
}

impl BatchSummary {
    pub(crate) fn new(total: usize) -> Self {
        Self {
            total,
            verified: 0,
            not_verified: 0,
            pending: total,
        }
    }

    pub(crate) fn record(&mut self, status: ItemStatus) {
        self.pending = self.pending.saturating_sub(1);
        if status == ItemStatus::Verified {
            self.verified += 1;
        } else {
            self.not_verified += 1;
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.verified + self.not_verified + self.pending == self.total
    }

    pub fn is_complete(&self) -> bool {
        self.pending == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcert_core::Timestamp;

    #[test]
    fn internal_errors_become_item_errors() {
        let mut item = BatchItem::pending(0, "x".into());
        item.resolve(VerificationResult::failure(ReasonCode::InternalError, Timestamp::now()));
        assert_eq!(item.status, ItemStatus::Error);
        assert_eq!(item.reason, Some(ReasonCode::Error));
    }

    #[test]
    fn failed_verification_is_not_verified() {
        let mut item = BatchItem::pending(0, "x".into());
        item.resolve(VerificationResult::failure(ReasonCode::Expired, Timestamp::now()));
        assert_eq!(item.status, ItemStatus::NotVerified);
        assert_eq!(item.reason, Some(ReasonCode::Expired));
    }

    #[test]
    fn summary_stays_balanced() {
        let mut s = BatchSummary::new(3);
        assert!(s.is_consistent());
        for status in [ItemStatus::Verified, ItemStatus::Error, ItemStatus::NotVerified] {
            s.record(status);
            assert!(s.is_consistent());
        }
        assert!(s.is_complete());
        assert_eq!((s.verified, s.not_verified), (1, 2));
    }
}
