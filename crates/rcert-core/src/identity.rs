//! # Domain Identity Newtypes
//!
//! You cannot pass a `WorkId` where a `CertificateId` is expected, and an
//! `ActorId` is never a bare `String`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Parse from the hyphenated UUID form.
            pub fn parse(s: &str) -> Result<Self, ValidationError> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|e| ValidationError::invalid($field, e.to_string()))
            }

            /// Access the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Identifier of a registered work.
    WorkId,
    "work_id"
);

uuid_id!(
    /// Identifier of an issued certificate.
    CertificateId,
    "certificate_id"
);

uuid_id!(
    /// Identifier of a batch verification run.
    BatchId,
    "batch_id"
);

/// The caller performing a privileged action (revocation).
///
/// Opaque to this crate; issued by whatever identity system fronts the
/// dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    /// Construct an actor id, rejecting blank input.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::MissingField("actor_id"));
        }
        Ok(Self(id))
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(CertificateId::new(), CertificateId::new());
    }

    #[test]
    fn parse_roundtrip() {
        let id = WorkId::new();
        assert_eq!(WorkId::parse(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(CertificateId::parse("not-a-uuid").is_err());
        assert!(BatchId::parse("").is_err());
    }

    #[test]
    fn serde_is_transparent() {
        let id = CertificateId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }

    #[test]
    fn actor_id_rejects_blank() {
        assert!(ActorId::new("  ").is_err());
        assert_eq!(ActorId::new("user-1").unwrap().as_str(), "user-1");
    }
}
