//! # Certificate Locator
//!
//! Callers identify a certificate either by its id or by the content hash
//! of the work it certifies:
//!
//! - hyphenated UUID → [`CertificateLocator::Id`]
//! - hex, optionally `0x`-prefixed, up to 128 digits →
//!   [`CertificateLocator::ContentHash`] (normalized to lowercase, no prefix)
//!
//! A 32-digit hex string is a content hash, not a simple-form UUID; only
//! the hyphenated form names a certificate id.

use rcert_core::CertificateId;

use crate::error::CertError;

const MAX_HASH_DIGITS: usize = 128;

/// How a verification request names its certificate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CertificateLocator {
    /// Direct certificate id.
    Id(CertificateId),
    /// Normalized content hash of the certified work.
    ContentHash(String),
}

impl CertificateLocator {
    /// Parse a caller-supplied identifier.
    pub fn parse(raw: &str) -> Result<Self, CertError> {
        let s = raw.trim();
        if s.is_empty() {
            return Err(CertError::InvalidInput("identifier is empty".to_string()));
        }
        if s.contains('-') {
            return CertificateId::parse(s)
                .map(Self::Id)
                .map_err(|_| CertError::InvalidInput(format!("{s:?} is not a certificate id")));
        }
        normalize_content_hash(s)
            .map(Self::ContentHash)
            .ok_or_else(|| CertError::InvalidInput(format!("{s:?} is not a hex content hash")))
    }
}

impl std::fmt::Display for CertificateLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::ContentHash(h) => write!(f, "0x{h}"),
        }
    }
}

/// Lowercase, strip `0x`, and check the remainder is 1..=128 hex digits.
pub fn normalize_content_hash(raw: &str) -> Option<String> {
    let s = raw.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if digits.is_empty()
        || digits.len() > MAX_HASH_DIGITS
        || !digits.bytes().all(|b| b.is_ascii_hexdigit())
    {
        return None;
    }
    Some(digits.to_ascii_lowercase())
}
