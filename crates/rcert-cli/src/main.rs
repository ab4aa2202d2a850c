//! # rcert CLI entry point

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rcert_cli::fingerprint::{run_fingerprint, FingerprintArgs};
use rcert_cli::keygen::{run_keygen, KeygenArgs};
use rcert_cli::verify::{run_verify, VerifyArgs};

/// Rights certificate tooling.
#[derive(Parser, Debug)]
#[command(name = "rcert", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an Ed25519 signing seed.
    Keygen(KeygenArgs),
    /// Print the fingerprint of a work.
    Fingerprint(FingerprintArgs),
    /// Verify an exported certificate against a public key.
    Verify(VerifyArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut stdout = std::io::stdout().lock();
    let result = match cli.command {
        Commands::Keygen(args) => run_keygen(&args, &mut stdout),
        Commands::Fingerprint(args) => run_fingerprint(&args, &mut stdout),
        Commands::Verify(args) => run_verify(&args, &mut stdout),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
