use thiserror::Error;

/// Errors from anchoring and anchor lookups.
///
/// None of these ever fail a verification; the verifier folds them into an
/// `UNAVAILABLE` cross-check.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnchorError {
    /// The ledger refused the fingerprint.
    #[error("anchor rejected: {0}")]
    Rejected(String),

    /// The ledger could not be reached or answered with a server error.
    #[error("ledger {network} unavailable: {reason}")]
    Unavailable {
        /// Network the adapter targets.
        network: String,
        /// Failure detail.
        reason: String,
    },

    /// The call did not finish within its budget.
    #[error("ledger {network} timed out after {after_ms}ms")]
    Timeout {
        /// Network the adapter targets.
        network: String,
        /// Budget that elapsed.
        after_ms: u64,
    },

    /// The ledger answered with something that is not an anchor record.
    #[error("malformed anchor response: {0}")]
    Malformed(String),
}

impl AnchorError {
    /// Transient failures are worth a single retry; rejections are not.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Timeout { .. })
    }
}
