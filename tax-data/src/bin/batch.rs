use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tax_core::TaxService;
use tax_core::db::{DbConfig, InMemoryRepositoryFactory, RepositoryRegistry};
use tax_data::{BatchFile, BatchReport};
use tax_db_sqlite::SqliteRepositoryFactory;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Calculate tax for every row of a CSV file.
///
/// The CSV file must have the header `totalIncome,wht,donation`. Every row
/// receives the personal allowance plus its donation, capped by the ceilings
/// stored in the database. The result is printed to stdout as JSON.
#[derive(Parser, Debug)]
#[command(name = "tax-batch")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file
    #[arg(short, long)]
    file: PathBuf,

    /// Ceiling store backend (sqlite or memory)
    #[arg(short, long, env = "DB_BACKEND", default_value = "sqlite")]
    backend: String,

    /// Database path or sqlx URL; ":memory:" for an ephemeral database
    #[arg(short, long, env = "DATABASE_URL", default_value = "taxes.db")]
    database: String,

    /// Pretty-print the JSON output
    #[arg(short, long, default_value_t = false)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry.register(Box::new(InMemoryRepositoryFactory));

    let config = DbConfig {
        backend: args.backend.clone(),
        connection_string: args.database.clone(),
    };
    let repo = registry
        .create(&config)
        .await
        .with_context(|| format!("Failed to open {} store: {}", args.backend, args.database))?;

    let service = TaxService::new(Arc::from(repo));
    service
        .prepare_store()
        .await
        .context("Failed to seed deduction ceilings")?;
    let ceilings = service
        .ceilings()
        .await
        .context("Failed to read deduction ceilings")?;

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;
    let batch = BatchFile::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;
    info!(rows = batch.len(), file = %args.file.display(), "parsed batch file");

    let report = batch
        .results(&ceilings)
        .collect::<Result<BatchReport, _>>()
        .context("Failed to calculate tax")?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", json);

    Ok(())
}
