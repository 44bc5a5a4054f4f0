//! Repository-backed entry points for the two computations.
//!
//! The calculators in [`crate::calculations`] are pure. The functions here
//! read a [`LedgerSnapshot`] through a [`LedgerRepository`] and hand it to
//! them. Creating a default tax configuration is a separate, explicit step
//! ([`ensure_default_config`]).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::calculations::{BalanceBuilder, BalanceInput, ManagementBalance, TaxEstimate, TaxEstimator};
use crate::db::repository::{LedgerRepository, RepositoryError};
use crate::models::{LedgerSnapshot, TaxConfig};

/// Returns the tax configuration for `year`, storing
/// [`TaxConfig::default_for_year`] first when the year has none.
///
/// An existing configuration is returned without any write. The insert
/// ignores duplicates, so two callers racing on a fresh year both end up
/// reading the single stored row.
pub async fn ensure_default_config(
    repo: &dyn LedgerRepository,
    year: i32,
) -> Result<TaxConfig, RepositoryError> {
    match repo.get_tax_config(year).await {
        Ok(config) => Ok(config),
        Err(RepositoryError::NotFound) => {
            let default = TaxConfig::default_for_year(year);
            repo.create_tax_config(&default).await?;
            info!(year, regime = %default.regime, "created default tax configuration");
            repo.get_tax_config(year).await
        }
        Err(e) => Err(e),
    }
}

/// Reads every invoice, expense, tax deadline and INPS record.
pub async fn load_snapshot(repo: &dyn LedgerRepository) -> Result<LedgerSnapshot, RepositoryError> {
    let snapshot = LedgerSnapshot {
        invoices: repo.list_invoices().await?,
        expenses: repo.list_expenses().await?,
        tax_deadlines: repo.list_tax_deadlines().await?,
        inps_contributions: repo.list_inps_contributions().await?,
    };

    debug!(
        invoices = snapshot.invoices.len(),
        expenses = snapshot.expenses.len(),
        tax_deadlines = snapshot.tax_deadlines.len(),
        inps_contributions = snapshot.inps_contributions.len(),
        "ledger snapshot loaded"
    );

    Ok(snapshot)
}

pub async fn build_balance(
    repo: &dyn LedgerRepository,
    year: i32,
    ref_date: NaiveDate,
    cash_balance: Decimal,
) -> Result<ManagementBalance, RepositoryError> {
    let snapshot = load_snapshot(repo).await?;
    let input = BalanceInput {
        year,
        ref_date,
        cash_balance,
    };
    Ok(BalanceBuilder::new(&snapshot).build(&input))
}

/// Estimates taxes for `year`, creating the default configuration when the
/// year has never been configured.
pub async fn estimate_taxes(
    repo: &dyn LedgerRepository,
    year: i32,
) -> Result<TaxEstimate, RepositoryError> {
    let config = ensure_default_config(repo, year).await?;
    let snapshot = load_snapshot(repo).await?;
    Ok(TaxEstimator::new(&config).estimate(&snapshot, year))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::db::memory::MemoryRepository;
    use crate::{Expense, InpsContribution, Invoice, TaxDeadline, TaxRegime};

    fn date(
        y: i32,
        m: u32,
        d: u32,
    ) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_snapshot() -> LedgerSnapshot {
        LedgerSnapshot {
            invoices: vec![
                Invoice {
                    id: 1,
                    number: "2025/001".to_string(),
                    issue_date: Some(date(2025, 1, 10)),
                    collection_date: Some(date(2025, 2, 10)),
                    amount: dec!(6000),
                },
                Invoice {
                    id: 2,
                    number: "2025/002".to_string(),
                    issue_date: Some(date(2025, 5, 2)),
                    collection_date: None,
                    amount: dec!(4000),
                },
            ],
            expenses: vec![Expense {
                id: 1,
                description: "CNC tooling".to_string(),
                expense_date: Some(date(2025, 3, 1)),
                payment_date: Some(date(2025, 3, 15)),
                paid: true,
                amount: dec!(4000),
            }],
            tax_deadlines: vec![TaxDeadline {
                id: 1,
                fiscal_year: 2025,
                category: "IRPEF first advance".to_string(),
                due_date: Some(date(2025, 11, 30)),
                estimated_amount: dec!(500),
                paid_amount: None,
            }],
            inps_contributions: vec![InpsContribution {
                id: 1,
                fiscal_year: 2025,
                amount_due: dec!(1000),
                amount_paid: Some(dec!(900)),
            }],
        }
    }

    fn standard_config() -> TaxConfig {
        TaxConfig {
            fiscal_year: 2025,
            regime: TaxRegime::Standard,
            tax_rate: dec!(0.23),
            contribution_rate: dec!(0.26),
            profitability_coefficient: None,
        }
    }

    // =========================================================================
    // ensure_default_config
    // =========================================================================

    #[tokio::test]
    async fn ensure_default_config_writes_default_once_for_fresh_year() {
        let repo = MemoryRepository::default();

        let first = ensure_default_config(&repo, 2025).await.unwrap();
        let second = ensure_default_config(&repo, 2025).await.unwrap();

        assert_eq!(first, TaxConfig::default_for_year(2025));
        assert_eq!(second, first);
        assert_eq!(repo.config_writes(), 1);
    }

    #[tokio::test]
    async fn ensure_default_config_keeps_existing_config() {
        let repo = MemoryRepository::default().with_config(standard_config());

        let config = ensure_default_config(&repo, 2025).await.unwrap();

        assert_eq!(config, standard_config());
        assert_eq!(repo.config_writes(), 0);
    }

    #[tokio::test]
    async fn ensure_default_config_propagates_storage_errors() {
        let repo = MemoryRepository::failing();

        let result = ensure_default_config(&repo, 2025).await;

        assert_eq!(
            result,
            Err(RepositoryError::Database("disk I/O error".to_string()))
        );
        assert_eq!(repo.config_writes(), 0);
    }

    // =========================================================================
    // load_snapshot / build_balance
    // =========================================================================

    #[tokio::test]
    async fn load_snapshot_reads_all_record_kinds() {
        let repo = MemoryRepository::with_snapshot(sample_snapshot());

        let snapshot = load_snapshot(&repo).await.unwrap();

        assert_eq!(snapshot, sample_snapshot());
    }

    #[tokio::test]
    async fn build_balance_matches_pure_builder() {
        let repo = MemoryRepository::with_snapshot(sample_snapshot());
        let input = BalanceInput {
            year: 2025,
            ref_date: date(2025, 6, 30),
            cash_balance: dec!(2500),
        };

        let balance = build_balance(&repo, input.year, input.ref_date, input.cash_balance)
            .await
            .unwrap();

        assert_eq!(balance, BalanceBuilder::new(&sample_snapshot()).build(&input));
        assert_eq!(balance.balance_sheet.accounts_receivable, dec!(4000));
        assert_eq!(balance.balance_sheet.tax_liabilities, dec!(500));
    }

    #[tokio::test]
    async fn build_balance_propagates_storage_errors() {
        let repo = MemoryRepository::failing();

        let result = build_balance(&repo, 2025, date(2025, 6, 30), dec!(0)).await;

        assert!(matches!(result, Err(RepositoryError::Database(_))));
    }

    // =========================================================================
    // estimate_taxes
    // =========================================================================

    #[tokio::test]
    async fn estimate_taxes_uses_default_config_for_fresh_year() {
        let repo = MemoryRepository::with_snapshot(sample_snapshot());

        let estimate = estimate_taxes(&repo, 2025).await.unwrap();

        assert_eq!(estimate.regime, TaxRegime::FlatRate);
        assert_eq!(estimate.revenue_taxable, dec!(10000));
        assert_eq!(estimate.cost_taxable, dec!(0));
        assert_eq!(estimate.taxable_income, dec!(7800));
        assert_eq!(estimate.tax_due, dec!(1170));
        assert_eq!(estimate.contribution_due, dec!(2028));
        assert_eq!(estimate.tax_recorded, dec!(500));
        assert_eq!(estimate.contribution_recorded, dec!(900));
        assert_eq!(repo.config_writes(), 1);
    }

    #[tokio::test]
    async fn estimate_taxes_is_idempotent_with_existing_config() {
        let repo = MemoryRepository::with_snapshot(sample_snapshot()).with_config(standard_config());

        let first = estimate_taxes(&repo, 2025).await.unwrap();
        let second = estimate_taxes(&repo, 2025).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.taxable_income, dec!(6000));
        assert_eq!(first.tax_due, dec!(1380));
        assert_eq!(repo.config_writes(), 0);
    }
}
