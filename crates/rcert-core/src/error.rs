//! # Core Error Types
//!
//! Errors shared by every crate in the workspace. Higher-level crates wrap
//! these in their own `thiserror` enums rather than re-declaring them.

use thiserror::Error;

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Input validation failure for a domain primitive.
///
/// Carries the offending field so callers can report it without
/// re-parsing the message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was absent or blank.
    #[error("required field `{0}` is missing or empty")]
    MissingField(&'static str),

    /// A field was present but malformed.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// A timestamp could not be parsed or violated the UTC-only rule.
    #[error("invalid timestamp {value:?}: {reason}")]
    Timestamp {
        /// The raw input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Invalid`].
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
