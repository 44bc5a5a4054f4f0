use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ledger_data::{LedgerCsvLoader, RecordKind};
use ledger_db_sqlite::SqliteRepository;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Load ledger records from a CSV file into the database.
///
/// Expected header rows:
/// - invoices: number,issue_date,collection_date,amount
/// - expenses: description,expense_date,payment_date,paid,amount
/// - deadlines: fiscal_year,category,due_date,estimated_amount,paid_amount
/// - contributions: fiscal_year,amount_due,amount_paid
///
/// Dates are YYYY-MM-DD; empty cells mean "not set".
/// Set `RUST_LOG=debug` for per-batch progress logs.
#[derive(Parser, Debug)]
#[command(name = "ledger-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Kind of records in the file
    #[arg(short, long, value_enum)]
    kind: RecordKind,

    /// Path to the CSV file
    #[arg(short, long)]
    file: PathBuf,

    /// SQLite database URL (e.g., sqlite:ledger.db?mode=rwc to create if missing)
    #[arg(short, long, default_value = "sqlite:ledger.db?mode=rwc")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,

    /// Run seed files from the specified directory after migrations
    #[arg(short, long)]
    seeds: Option<PathBuf>,
}

/// `RUST_LOG` when set, otherwise warnings only.
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();

    let repo = SqliteRepository::new(&args.database)
        .await
        .with_context(|| format!("Failed to connect to database: {}", args.database))?;

    if args.migrate {
        println!("Running migrations...");
        repo.run_migrations()
            .await
            .context("Failed to run migrations")?;
        println!("Migrations complete.");
    }

    if let Some(seeds_dir) = &args.seeds {
        println!("Running seeds from: {}", seeds_dir.display());
        repo.run_seeds(seeds_dir)
            .await
            .with_context(|| format!("Failed to run seeds from: {}", seeds_dir.display()))?;
        println!("Seeds complete.");
    }

    println!("Loading {:?} from: {}", args.kind, args.file.display());

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;

    let inserted = LedgerCsvLoader::import(&repo, args.kind, file)
        .await
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    info!(kind = ?args.kind, inserted, "csv import finished");
    println!("Successfully loaded {} records into the database.", inserted);

    Ok(())
}
