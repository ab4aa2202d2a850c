//! # Keygen Subcommand
//!
//! Prints a new signing seed for `RCERT_SIGNING_KEY_HEX` together with the
//! public key and key id that verifiers will see.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use rcert_crypto::SigningKey;

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Print only the seed hex, for piping into a secret store.
    #[arg(long)]
    pub seed_only: bool,
}

pub fn run_keygen(args: &KeygenArgs, out: &mut impl Write) -> Result<u8> {
    let sk = SigningKey::generate();
    let vk = sk.verifying_key();
    let seed = sk.seed_hex();

    if args.seed_only {
        writeln!(out, "{}", seed.as_str())?;
        return Ok(0);
    }
    writeln!(out, "seed:       {}", seed.as_str())?;
    writeln!(out, "public key: {}", vk.to_hex())?;
    writeln!(out, "key id:     {}", vk.key_id())?;
    tracing::info!(key_id = %vk.key_id(), "generated Ed25519 keypair");
    Ok(0)
}
