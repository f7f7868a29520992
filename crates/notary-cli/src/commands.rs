use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use notary_sdk::{
    FileLedger, InMemoryLedger, Notary, NotaryConfig, SecretKey, Verdict,
    VerificationReport,
};
use serde_json::Value;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => NotaryConfig::load(path)?,
        None => NotaryConfig::default(),
    };
    let format = cli.format;

    match cli.command {
        Command::Domains => cmd_domains(&config, format),
        Command::Hash(args) => {
            let secret = load_secret(&cli.secret_env)?;
            cmd_hash(config, args, &secret, format)
        }
        Command::Commit(args) => {
            let secret = load_secret(&cli.secret_env)?;
            let notary = open_notary(config, &cli.ledger)?;
            cmd_commit(&notary, args, &secret, format).await
        }
        Command::Verify(args) => {
            let secret = load_secret(&cli.secret_env)?;
            let notary = open_notary(config, &cli.ledger)?;
            cmd_verify(&notary, args, &secret, format).await
        }
        Command::Trail(args) => {
            let notary = open_notary(config, &cli.ledger)?;
            cmd_trail(&notary, args, format).await
        }
    }
}

fn load_secret(var: &str) -> anyhow::Result<SecretKey> {
    let text = std::env::var(var).with_context(|| format!("secret variable {var} is not set"))?;
    Ok(SecretKey::from_text(&text)?)
}

fn open_notary(config: NotaryConfig, ledger: &Path) -> anyhow::Result<Notary> {
    let ledger = FileLedger::open(ledger)
        .with_context(|| format!("cannot open ledger {}", ledger.display()))?;
    Ok(Notary::with_ledger(config, Arc::new(ledger))?)
}

fn read_body(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read record {}", path.display()))?;
    let body: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    Ok(body)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_domains(config: &NotaryConfig, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(&config.domains);
    }
    for domain in &config.domains {
        println!(
            "{}  key: {}  hash: {}  ledger: {}",
            domain.name.bold(),
            domain.key_field.cyan(),
            domain.hash_field.cyan(),
            domain.ledger_address.as_str().yellow()
        );
        println!("  fields: {}", domain.fields.join(", "));
    }
    Ok(())
}

fn cmd_hash(
    config: NotaryConfig,
    args: HashArgs,
    secret: &SecretKey,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let notary = Notary::with_ledger(config, Arc::new(InMemoryLedger::new()))?;
    let body = read_body(&args.record)?;
    let fingerprint = notary.fingerprint_json(&args.domain, &body, secret)?;

    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({
            "domain": args.domain,
            "canonical": fingerprint.canonical,
            "hash": fingerprint.hash.to_hex(),
        }));
    }
    println!("Canonical: {}", fingerprint.canonical.dimmed());
    println!("Hash:      {}", fingerprint.hash.to_hex().yellow());
    Ok(())
}

async fn cmd_commit(
    notary: &Notary,
    args: CommitArgs,
    secret: &SecretKey,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let body = read_body(&args.record)?;
    let outcome = notary.commit_json(&args.domain, &body, secret).await?;

    if format == OutputFormat::Json {
        return print_json(&outcome);
    }
    println!("{} Hash committed", "✓".green().bold());
    println!("  Domain:      {}", outcome.domain);
    println!("  Key:         {}", outcome.commitment.domain_key.as_str().bold());
    println!("  Hash:        {}", outcome.hash.yellow());
    println!("  Transaction: {}", outcome.commitment.transaction_id.as_str().cyan());
    println!("  Tx hash:     {}", outcome.commitment.transaction_hash.dimmed());
    Ok(())
}

async fn cmd_verify(
    notary: &Notary,
    args: VerifyArgs,
    secret: &SecretKey,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut body = read_body(&args.record)?;
    if let Some(hash) = args.hash {
        let hash_field = notary.domain(&args.domain)?.hash_field.clone();
        body.as_object_mut()
            .context("record must be a JSON object")?
            .insert(hash_field, Value::String(hash));
    }
    let report = notary.verify_json(&args.domain, &body, secret).await?;

    if format == OutputFormat::Json {
        return print_json(&report);
    }
    print_report(&report);
    Ok(())
}

fn print_report(report: &VerificationReport) {
    let verdict = match report.verdict {
        Verdict::Verified => format!("✓ {}", report.verdict).green().bold(),
        Verdict::HashTampered | Verdict::DataTampered => {
            format!("✗ {}", report.verdict).red().bold()
        }
    };
    println!("{verdict}  {}", report.verdict.message());
    println!("  Key:        {}", report.domain_key.as_str().bold());
    println!("  Provided:   {}", report.hashes.provided);
    println!("  Ledger:     {}", report.hashes.ledger);
    println!("  Recomputed: {}", report.hashes.recomputed);
}

async fn cmd_trail(notary: &Notary, args: TrailArgs, format: OutputFormat) -> anyhow::Result<()> {
    let trail = notary.trail(&args.domain, &Value::String(args.key)).await?;

    if format == OutputFormat::Json {
        return print_json(&trail);
    }
    println!(
        "Trail for {} {} ({} commitment(s))",
        trail.domain,
        trail.domain_key.as_str().bold(),
        trail.len()
    );
    for entry in &trail.entries {
        let time = entry
            .submission_time
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".into());
        println!("  {:>3}  {}  {}", entry.index.to_string().yellow(), entry.hash, time.dimmed());
    }
    Ok(())
}
