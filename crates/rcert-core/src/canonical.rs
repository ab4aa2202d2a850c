//! # Canonical Serialization — JCS Byte Production
//!
//! `CanonicalBytes` is the sole construction path for bytes that are hashed
//! (work fingerprints) or signed (certificate metadata snapshots).
//!
//! ## Security Invariant
//!
//! The inner `Vec<u8>` is private. The only constructor is
//! [`CanonicalBytes::new()`], which serializes to a JSON value, rejects
//! floats, and emits RFC 8785 output (sorted keys, compact separators). Any
//! function that needs signable bytes takes `&CanonicalBytes`, so a
//! non-canonical serialization can never reach the signer or the digest.
//!
//! Sorted-key output is what makes fingerprints independent of field
//! construction order: two logically equal objects always produce the same
//! byte sequence.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// # Invariants
///
/// - Object keys are sorted, separators are compact.
/// - Numbers are integers; floats are rejected.
/// - Output is valid UTF-8 JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::FloatRejected` if the value contains a
    /// non-integer number, or `SerializationFailed` if serde cannot represent
    /// the value as JSON.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        Self::from_value(value)
    }

    /// Canonicalize an already-built JSON value.
    pub fn from_value(value: Value) -> Result<Self, CanonicalizationError> {
        reject_floats(&value)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// View the canonical bytes as a UTF-8 string.
    ///
    /// Infallible in practice: JCS output is always UTF-8. Falls back to an
    /// empty string rather than panicking.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
        Value::Number(n) => {
            if n.is_f64() && !n.is_i64() && !n.is_u64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(())
        }
        Value::Object(map) => map.values().try_for_each(reject_floats),
        Value::Array(arr) => arr.iter().try_for_each(reject_floats),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_sorted_and_compact() {
        let data = serde_json::json!({"title": "Neon Dreams", "category": "music", "ownerId": "u-1"});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(
            cb.as_str(),
            r#"{"category":"music","ownerId":"u-1","title":"Neon Dreams"}"#
        );
    }

    #[test]
    fn nested_objects_are_sorted() {
        let data = serde_json::json!({"z": {"b": 2, "a": 1}, "a": [3, 2, 1]});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(cb.as_str(), r#"{"a":[3,2,1],"z":{"a":1,"b":2}}"#);
    }

    #[test]
    fn floats_are_rejected_at_any_depth() {
        let data = serde_json::json!({"a": {"b": [{"c": 0.5}]}});
        match CanonicalBytes::new(&data) {
            Err(CanonicalizationError::FloatRejected(f)) => assert_eq!(f, 0.5),
            other => panic!("expected FloatRejected, got {other:?}"),
        }
    }

    #[test]
    fn integers_and_nulls_pass() {
        let data = serde_json::json!({"version": 1, "expiresAt": null, "neg": -7});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(cb.as_str(), r#"{"expiresAt":null,"neg":-7,"version":1}"#);
    }

    #[test]
    fn unicode_is_preserved() {
        let data = serde_json::json!({"title": "Caf\u{00e9} Noir"});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert!(cb.as_str().contains('\u{00e9}'));
        assert!(!cb.is_empty());
    }

    #[test]
    fn struct_field_order_does_not_matter() {
        #[derive(Serialize)]
        struct A {
            b: u8,
            a: u8,
        }
        #[derive(Serialize)]
        struct B {
            a: u8,
            b: u8,
        }
        let x = CanonicalBytes::new(&A { b: 2, a: 1 }).unwrap();
        let y = CanonicalBytes::new(&B { a: 1, b: 2 }).unwrap();
        assert_eq!(x, y);
    }
}
