//! # Registered Works
//!
//! A `Work` is immutable once registered. Edits produce a new version
//! elsewhere; this crate only reads works.

use rcert_core::{Timestamp, WorkId};
use serde::{Deserialize, Serialize};

use crate::error::CertError;
use crate::fingerprint::fingerprint;

/// A registered creative work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    /// Work identifier.
    pub id: WorkId,
    /// Title as registered.
    pub title: String,
    /// Work type (e.g. `"music"`, `"image"`).
    #[serde(rename = "type")]
    pub work_type: String,
    /// Catalogue category.
    pub category: String,
    /// Owning account.
    pub owner_id: String,
    /// Owner contact address. Personal data; redacted from public output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
    /// Hex digest of the work's content, optionally `0x`-prefixed.
    pub content_hash: String,
    /// Free-form keywords.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Registration time.
    pub created_at: Timestamp,
}

/// Registration input: a work before it has an id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkDraft {
    pub title: String,
    #[serde(rename = "type")]
    pub work_type: String,
    pub category: String,
    pub owner_id: String,
    #[serde(default)]
    pub owner_email: Option<String>,
    pub content_hash: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl WorkDraft {
    /// Assign an id and registration time.
    ///
    /// Runs the fingerprint validation so a work that could never be
    /// certified is rejected at registration.
    pub fn into_work(self, created_at: Timestamp) -> Result<Work, CertError> {
        let work = Work {
            id: WorkId::new(),
            title: self.title,
            work_type: self.work_type,
            category: self.category,
            owner_id: self.owner_id,
            owner_email: self.owner_email.filter(|e| !e.trim().is_empty()),
            content_hash: self.content_hash,
            keywords: self.keywords,
            created_at,
        };
        fingerprint(&work)?;
        Ok(work)
    }
}
