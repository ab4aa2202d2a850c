//! # rcert-cli — Offline Certificate Tooling
//!
//! ## Subcommands
//!
//! - `rcert keygen` — fresh Ed25519 signing seed and its public key.
//! - `rcert fingerprint` — fingerprint of a work description.
//! - `rcert verify` — check an exported certificate against a published
//!   public key, without contacting the issuing service.
//!
//! ```bash
//! rcert keygen
//! rcert fingerprint --work work.json
//! rcert verify --certificate cert.json --public-key 3d4017c3... --at 2027-01-01T00:00:00Z
//! ```
//!
//! Every handler writes to a caller-supplied sink and returns the process
//! exit code, so the binary stays a thin dispatcher.

pub mod fingerprint;
pub mod keygen;
pub mod verify;

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Exit code for a certificate that did not verify.
pub const EXIT_NOT_VERIFIED: u8 = 2;

/// Read and parse a JSON file.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {what}: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {what} JSON: {}", path.display()))
}
