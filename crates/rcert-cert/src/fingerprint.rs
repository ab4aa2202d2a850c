//! # Fingerprint Generator
//!
//! `fingerprint(work)` is SHA-256 over the JCS canonical form of:
//!
//! ```json
//! {"category":…,"contentHash":…,"keywords":[…],"ownerId":…,"title":…,"type":…}
//! ```
//!
//! - Keys are sorted by the canonicalizer, never by construction order.
//! - `contentHash` is normalized (lowercase, `0x` stripped).
//! - `keywords` are trimmed, blank entries dropped, then sorted and
//!   deduplicated, so keyword order carries no meaning.
//!
//! No side effects. Missing required fields yield `CertError::InvalidInput`.

use rcert_core::{sha256_digest, CanonicalBytes, ContentDigest};
use serde::Serialize;

use crate::error::CertError;
use crate::locator::normalize_content_hash;
use crate::work::Work;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FingerprintInput<'a> {
    title: &'a str,
    #[serde(rename = "type")]
    work_type: &'a str,
    category: &'a str,
    owner_id: &'a str,
    content_hash: String,
    keywords: Vec<&'a str>,
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, CertError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CertError::InvalidInput(format!("{field} is required")));
    }
    Ok(trimmed)
}

/// Deterministic digest of a work's identifying metadata.
pub fn fingerprint(work: &Work) -> Result<ContentDigest, CertError> {
    let raw_hash = required("contentHash", &work.content_hash)?;
    let content_hash = normalize_content_hash(raw_hash).ok_or_else(|| {
        CertError::InvalidInput(format!("contentHash {raw_hash:?} is not a hex digest"))
    })?;

    let mut keywords: Vec<&str> = work
        .keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .collect();
    keywords.sort_unstable();
    keywords.dedup();

    let input = FingerprintInput {
        title: required("title", &work.title)?,
        work_type: required("type", &work.work_type)?,
        category: required("category", &work.category)?,
        owner_id: required("ownerId", &work.owner_id)?,
        content_hash,
        keywords,
    };
    let canonical = CanonicalBytes::new(&input)
        .map_err(|e| CertError::Internal(format!("fingerprint canonicalization: {e}")))?;
    Ok(sha256_digest(&canonical))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcert_core::{Timestamp, WorkId};

    fn work() -> Work {
        Work {
            id: WorkId::new(),
            title: "Neon Dreams".into(),
            work_type: "music".into(),
            category: "electronic".into(),
            owner_id: "artist-7".into(),
            owner_email: None,
            content_hash: "0xAAA".into(),
            keywords: vec!["synth".into(), "night".into()],
            created_at: Timestamp::now(),
        }
    }

    #[test]
    fn deterministic() {
        let w = work();
        assert_eq!(fingerprint(&w).unwrap(), fingerprint(&w).unwrap());
    }

    #[test]
    fn independent_of_id_timestamp_and_email() {
        let a = work();
        let mut b = work();
        b.owner_email = Some("x@example.com".into());
        b.created_at = Timestamp::parse("2020-01-01T00:00:00Z").unwrap();
        assert_eq!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
    }

    #[test]
    fn keyword_order_and_duplicates_ignored() {
        let a = work();
        let mut b = work();
        b.keywords = vec!["night".into(), " synth ".into(), "night".into()];
        assert_eq!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
    }

    #[test]
    fn content_hash_case_and_prefix_normalized() {
        let a = work();
        let mut b = work();
        b.content_hash = "aaa".into();
        assert_eq!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
    }

    #[test]
    fn title_change_changes_fingerprint() {
        let a = work();
        let mut b = work();
        b.title = "Neon Dream".into();
        assert_ne!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
    }

    #[test]
    fn missing_fields_rejected() {
        for field in ["title", "type", "category", "ownerId", "contentHash"] {
            let mut w = work();
            match field {
                "title" => w.title = " ".into(),
                "type" => w.work_type.clear(),
                "category" => w.category.clear(),
                "ownerId" => w.owner_id.clear(),
                _ => w.content_hash.clear(),
            }
            match fingerprint(&w) {
                Err(CertError::InvalidInput(msg)) => assert!(msg.contains(field), "{msg}"),
                other => panic!("{field}: expected InvalidInput, got {other:?}"),
            }
        }
    }

    #[test]
    fn non_hex_content_hash_rejected() {
        let mut w = work();
        w.content_hash = "not-a-hash".into();
        assert!(matches!(fingerprint(&w), Err(CertError::InvalidInput(_))));
    }
}
