//! # Verify Subcommand
//!
//! Offline evaluation of an exported certificate: revocation flag,
//! expiry, snapshot integrity and signature. Work binding and the ledger
//! cross-check need the service and are not run here.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Args;
use rcert_cert::{evaluate_certificate, Certificate};
use rcert_core::Timestamp;
use rcert_crypto::PublishedKey;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Path to the certificate JSON.
    #[arg(long)]
    pub certificate: PathBuf,
    /// Issuer public key (hex-encoded 32 bytes).
    #[arg(long)]
    pub public_key: String,
    /// Evaluation instant (RFC 3339). Defaults to now.
    #[arg(long)]
    pub at: Option<String>,
}

pub fn run_verify(args: &VerifyArgs, out: &mut impl Write) -> Result<u8> {
    let key = PublishedKey::from_hex(args.public_key.trim())
        .map_err(|e| anyhow!("invalid public key: {e}"))?;
    let cert: Certificate = crate::read_json(&args.certificate, "certificate")?;
    let at = match args.at.as_deref() {
        Some(raw) => Timestamp::parse_lenient(raw).map_err(|e| anyhow!("invalid --at: {e}"))?,
        None => Timestamp::now(),
    };

    let result = evaluate_certificate(&cert, &key, at);
    tracing::debug!(certificate_id = %cert.id, reason = ?result.reason, "evaluated");
    writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
    Ok(if result.verified {
        0
    } else {
        crate::EXIT_NOT_VERIFIED
    })
}
