use anyhow::{Context, Result};
use chrono::NaiveDate;
use ledger_core::db::RepositoryRegistry;
use ledger_core::{LedgerRepository, service};
use ledger_db_sqlite::SqliteRepositoryFactory;
use rust_decimal::Decimal;
use tracing::info;

use crate::config::LedgerConfig;
use crate::format::{self, OutputFormat, format_rate};

/// Registry with every backend this binary ships.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

pub async fn open_repository(config: &LedgerConfig) -> Result<Box<dyn LedgerRepository>> {
    let db_config = config.db_config();
    build_registry()
        .create(&db_config)
        .await
        .with_context(|| {
            format!(
                "cannot open {} database '{}'",
                db_config.backend, db_config.connection_string
            )
        })
}

pub async fn balance_report(
    repo: &dyn LedgerRepository,
    year: i32,
    ref_date: NaiveDate,
    cash_balance: Decimal,
    output: OutputFormat,
) -> Result<String> {
    info!(year, %ref_date, %cash_balance, "building management balance");
    let balance = service::build_balance(repo, year, ref_date, cash_balance)
        .await
        .context("failed to build management balance")?;

    match output {
        OutputFormat::Table => Ok(format::balance_table(&balance)),
        OutputFormat::Json => format::balance_json(&balance).context("failed to encode JSON"),
    }
}

pub async fn taxes_report(
    repo: &dyn LedgerRepository,
    year: i32,
    output: OutputFormat,
) -> Result<String> {
    info!(year, "estimating taxes");
    let estimate = service::estimate_taxes(repo, year)
        .await
        .context("failed to estimate taxes")?;

    match output {
        OutputFormat::Table => Ok(format::tax_table(&estimate)),
        OutputFormat::Json => format::tax_json(&estimate).context("failed to encode JSON"),
    }
}

/// Makes sure `year` has a tax configuration and describes it, followed by
/// every configured year, newest first.
pub async fn config_init(
    repo: &dyn LedgerRepository,
    year: i32,
) -> Result<String> {
    let config = service::ensure_default_config(repo, year)
        .await
        .with_context(|| format!("failed to initialise tax configuration for {year}"))?;

    let coefficient = config
        .profitability_coefficient
        .map(format_rate)
        .unwrap_or_else(|| "-".to_string());

    let years = repo
        .list_tax_config_years()
        .await
        .context("failed to list configured years")?
        .iter()
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!(
        "{}: regime {}, tax rate {}, contribution rate {}, profitability coefficient {}\nconfigured years: {}",
        config.fiscal_year,
        config.regime,
        format_rate(config.tax_rate),
        format_rate(config.contribution_rate),
        coefficient,
        years
    ))
}
