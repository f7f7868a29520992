use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Ledger file used when `--ledger` is not given.
pub const DEFAULT_LEDGER: &str = ".notary/ledger.bin";
/// Environment variable holding the hashing secret by default.
pub const DEFAULT_SECRET_ENV: &str = "HASH_SECRET_KEY";

#[derive(Parser)]
#[command(
    name = "notary",
    about = "Record notary: commit tamper-evident record fingerprints and verify them",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML config file; built-in domains and defaults when omitted
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Append-only ledger file
    #[arg(long, global = true, default_value = DEFAULT_LEDGER)]
    pub ledger: PathBuf,

    /// Environment variable holding the hashing secret
    #[arg(long, global = true, default_value = DEFAULT_SECRET_ENV)]
    pub secret_env: String,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// List configured domains and their hashed fields
    Domains,
    /// Hash a record and commit the hash to the ledger
    Commit(CommitArgs),
    /// Verify a record against its latest ledger commitment
    Verify(VerifyArgs),
    /// Show every commitment recorded for a key
    Trail(TrailArgs),
    /// Print a record's canonical form and hash without touching the ledger
    Hash(HashArgs),
}

#[derive(Args)]
pub struct CommitArgs {
    #[arg(short, long)]
    pub domain: String,
    /// JSON file holding the record
    #[arg(short, long)]
    pub record: PathBuf,
}

#[derive(Args)]
pub struct VerifyArgs {
    #[arg(short, long)]
    pub domain: String,
    #[arg(short, long)]
    pub record: PathBuf,
    /// Claimed hash; read from the record's hash field when omitted
    #[arg(long)]
    pub hash: Option<String>,
}

#[derive(Args)]
pub struct TrailArgs {
    #[arg(short, long)]
    pub domain: String,
    #[arg(short, long)]
    pub key: String,
}

#[derive(Args)]
pub struct HashArgs {
    #[arg(short, long)]
    pub domain: String,
    #[arg(short, long)]
    pub record: PathBuf,
}
