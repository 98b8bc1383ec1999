use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use haushalt_core::UserTransaction;
use haushalt_ingest::{ingest_with, IngestOptions};
use haushalt_reconcile::{compare, generate, report_filename};

#[derive(Parser)]
#[command(name = "haushalt")]
#[command(about = "Reconcile your recorded transactions against a bank-statement CSV")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare recorded transactions against a statement and write a report
    Reconcile {
        /// Bank-statement CSV export
        #[arg(long)]
        statement: PathBuf,
        /// Recorded transactions as a JSON array
        #[arg(long)]
        transactions: PathBuf,
        /// Report path (default: bank-comparison-report-<today>.csv)
        #[arg(long)]
        output: Option<PathBuf>,
        /// TOML ingest profile (delimiter, date patterns, credit markers)
        #[arg(long)]
        profile: Option<PathBuf>,
    },
    /// Parse a statement and print the normalized records as CSV
    Ingest {
        /// Bank-statement CSV export
        #[arg(long)]
        statement: PathBuf,
        /// TOML ingest profile (delimiter, date patterns, credit markers)
        #[arg(long)]
        profile: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match Cli::parse().command {
        Command::Reconcile {
            statement,
            transactions,
            output,
            profile,
        } => reconcile(&statement, &transactions, output, profile.as_deref()),
        Command::Ingest { statement, profile } => print_records(&statement, profile.as_deref()),
    }
}

fn load_options(profile: Option<&Path>) -> Result<IngestOptions> {
    match profile {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading profile {}", path.display()))?;
            toml::from_str(&text).with_context(|| format!("parsing profile {}", path.display()))
        }
        None => Ok(IngestOptions::default()),
    }
}

fn ingest_statement(statement: &Path, profile: Option<&Path>) -> Result<Vec<haushalt_core::BankRecord>> {
    let opts = load_options(profile)?;
    let raw = fs::read_to_string(statement)
        .with_context(|| format!("reading statement {}", statement.display()))?;
    let records = ingest_with(&raw, &opts).context("check your CSV format")?;
    tracing::info!(records = records.len(), "statement parsed");
    Ok(records)
}

fn reconcile(
    statement: &Path,
    transactions: &Path,
    output: Option<PathBuf>,
    profile: Option<&Path>,
) -> Result<()> {
    let records = ingest_statement(statement, profile)?;

    let json = fs::read_to_string(transactions)
        .with_context(|| format!("reading transactions {}", transactions.display()))?;
    let users: Vec<UserTransaction> = serde_json::from_str(&json)
        .with_context(|| format!("parsing transactions {}", transactions.display()))?;

    let result = compare(&users, &records)?;
    tracing::info!(
        matched = result.matched.len(),
        mismatched = result.mismatched.len(),
        user_only = result.user_only.len(),
        bank_only = result.bank_only.len(),
        "comparison complete"
    );

    let report = generate(&result)?;
    let path =
        output.unwrap_or_else(|| PathBuf::from(report_filename(chrono::Local::now().date_naive())));
    fs::write(&path, report).with_context(|| format!("writing report {}", path.display()))?;
    println!("report written to {}", path.display());
    Ok(())
}

fn print_records(statement: &Path, profile: Option<&Path>) -> Result<()> {
    let records = ingest_statement(statement, profile)?;
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    writer.write_record(["date", "description", "amount", "type"])?;
    for rec in &records {
        writer.write_record([
            rec.date.to_string(),
            rec.description.clone(),
            format!("{:.2}", rec.amount.round_dp(2)),
            rec.flow.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
