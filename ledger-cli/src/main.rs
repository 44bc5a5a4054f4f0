use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::debug;

use ledger_cli::config::{DEFAULT_CONFIG_FILE, LedgerConfig};
use ledger_cli::format::OutputFormat;
use ledger_cli::{app, logging};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Management balance and Italian tax/INPS estimate for a small business ledger.
#[derive(Debug, Parser)]
#[command(name = "ledger", version, about)]
struct Cli {
    /// Settings file; `ledger.toml` is read when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database backend (overrides `database.backend`).
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Connection string or database file path, e.g. `ledger.db` (overrides `database.connection`).
    #[arg(long, global = true)]
    db: Option<String>,

    /// Print JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    /// Log level or filter directive (overrides `logging.level`; `RUST_LOG` wins over both).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Balance sheet, income statement and indicators.
    Balance {
        /// Fiscal year of the income statement.
        #[arg(long)]
        year: i32,

        /// Date of the balance-sheet position (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        ref_date: Option<NaiveDate>,

        /// Cash on hand at the reference date (overrides `defaults.cash_balance`).
        #[arg(long, allow_hyphen_values = true)]
        cash: Option<Decimal>,
    },

    /// Statutory tax and INPS estimate.
    Taxes {
        #[arg(long)]
        year: i32,
    },

    /// Store the default tax configuration for a year that has none.
    ConfigInit {
        #[arg(long)]
        year: i32,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<LedgerConfig> {
    let mut config = match &cli.config {
        Some(path) => LedgerConfig::load(path)?,
        None => LedgerConfig::load_or_default(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    config.apply_overrides(cli.backend.clone(), cli.db.clone(), cli.log_level.clone())?;
    Ok(config)
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli).context("failed to load configuration")?;
    logging::init_logging(&config.logging.level, config.logging.file.as_deref())?;

    let output = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };

    debug!("connecting to {} backend", config.database.backend);
    let repo = app::open_repository(&config).await?;

    let text = match cli.command {
        Command::Balance {
            year,
            ref_date,
            cash,
        } => {
            let ref_date = ref_date.unwrap_or_else(|| Local::now().date_naive());
            let cash = cash.unwrap_or(config.defaults.cash_balance);
            app::balance_report(&*repo, year, ref_date, cash, output).await?
        }
        Command::Taxes { year } => app::taxes_report(&*repo, year, output).await?,
        Command::ConfigInit { year } => app::config_init(&*repo, year).await?,
    };

    println!("{text}");
    Ok(())
}
