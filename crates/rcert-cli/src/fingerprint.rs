//! # Fingerprint Subcommand
//!
//! Accepts either a registered work (with `id` and `createdAt`) or a bare
//! registration draft. Neither field contributes to the digest.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Args;
use rcert_cert::{fingerprint, Work, WorkDraft};
use rcert_core::Timestamp;

#[derive(Args, Debug)]
pub struct FingerprintArgs {
    /// Path to the work JSON.
    #[arg(long)]
    pub work: PathBuf,
}

pub fn run_fingerprint(args: &FingerprintArgs, out: &mut impl Write) -> Result<u8> {
    let value: serde_json::Value = crate::read_json(&args.work, "work")?;
    let work = match serde_json::from_value::<Work>(value.clone()) {
        Ok(work) => work,
        Err(_) => {
            let draft: WorkDraft = serde_json::from_value(value)
                .map_err(|e| anyhow!("{} is not a work description: {e}", args.work.display()))?;
            draft
                .into_work(Timestamp::now())
                .map_err(|e| anyhow!("invalid work: {e}"))?
        }
    };
    let digest = fingerprint(&work).map_err(|e| anyhow!("invalid work: {e}"))?;
    writeln!(out, "{}", digest.to_hex())?;
    Ok(0)
}
