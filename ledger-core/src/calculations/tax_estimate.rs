//! Statutory tax and INPS estimate for one fiscal year.
//!
//! # Steps
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Configuration for the year (supplied by the caller) |
//! | 2    | Taxable revenue: invoices by reference date |
//! | 3    | Taxable cost: expenses by reference date, standard regime only |
//! | 4    | Taxable income: revenue × coefficient (flat-rate) or revenue − cost |
//! | 5    | Tax and contribution due on max(income, 0) |
//! | 6    | Amounts already recorded as paid or scheduled (informational) |
//!
//! The estimator is pure. Creating a missing configuration is the job of
//! [`crate::service::ensure_default_config`].
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use ledger_core::calculations::TaxEstimator;
//! use ledger_core::{Invoice, LedgerSnapshot, TaxConfig};
//!
//! let snapshot = LedgerSnapshot {
//!     invoices: vec![Invoice {
//!         id: 1,
//!         number: "2025/001".to_string(),
//!         issue_date: NaiveDate::from_ymd_opt(2025, 2, 1),
//!         collection_date: None,
//!         amount: dec!(10000),
//!     }],
//!     ..Default::default()
//! };
//!
//! let config = TaxConfig::default_for_year(2025);
//! let estimate = TaxEstimator::new(&config).estimate(&snapshot, 2025);
//!
//! assert_eq!(estimate.taxable_income, dec!(7800));
//! assert_eq!(estimate.tax_due, dec!(1170));
//! assert_eq!(estimate.contribution_due, dec!(2028));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{
    RowValue, contribution_amount, costs_for_year, deadlines_for_year, is_tax_category, max,
    revenue_for_year,
};
use crate::{LedgerSnapshot, TaxConfig, TaxRegime};

/// Result of the statutory estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxEstimate {
    pub year: i32,
    pub regime: TaxRegime,
    pub revenue_taxable: Decimal,
    /// Always zero under the flat-rate regime.
    pub cost_taxable: Decimal,
    /// Not floored; may be negative under the standard regime.
    pub taxable_income: Decimal,
    pub tax_rate: Decimal,
    pub tax_due: Decimal,
    pub contribution_base: Decimal,
    pub contribution_rate: Decimal,
    pub contribution_due: Decimal,
    /// Tax deadlines of the year, paid amount or estimate.
    pub tax_recorded: Decimal,
    /// INPS records of the year, paid amount or amount due.
    pub contribution_recorded: Decimal,
}

impl TaxEstimate {
    /// Labelled values for display, in field order.
    pub fn rows(&self) -> Vec<(&'static str, RowValue)> {
        vec![
            ("Year", RowValue::Integer(i64::from(self.year))),
            ("Regime", RowValue::Text(self.regime.as_str().to_string())),
            ("Taxable revenue", RowValue::Amount(self.revenue_taxable)),
            ("Deductible costs", RowValue::Amount(self.cost_taxable)),
            ("Taxable income", RowValue::Amount(self.taxable_income)),
            ("Tax rate", RowValue::Rate(self.tax_rate)),
            ("Tax due", RowValue::Amount(self.tax_due)),
            ("Contribution base", RowValue::Amount(self.contribution_base)),
            ("Contribution rate", RowValue::Rate(self.contribution_rate)),
            ("Contribution due", RowValue::Amount(self.contribution_due)),
            ("Tax recorded", RowValue::Amount(self.tax_recorded)),
            (
                "Contributions recorded",
                RowValue::Amount(self.contribution_recorded),
            ),
        ]
    }
}

/// Calculator for the statutory estimate of one configured year.
#[derive(Debug, Clone)]
pub struct TaxEstimator<'a> {
    config: &'a TaxConfig,
}

impl<'a> TaxEstimator<'a> {
    pub fn new(config: &'a TaxConfig) -> Self {
        Self { config }
    }

    /// Runs steps 2–6 for `year`. Never fails.
    pub fn estimate(
        &self,
        snapshot: &LedgerSnapshot,
        year: i32,
    ) -> TaxEstimate {
        let revenue_taxable = revenue_for_year(&snapshot.invoices, year);
        let cost_taxable = self.cost_taxable(snapshot, year);
        let taxable_income = self.taxable_income(revenue_taxable, cost_taxable);

        let contribution_base = max(taxable_income, Decimal::ZERO);
        let tax_due = contribution_base * self.config.tax_rate;
        let contribution_due = contribution_base * self.config.contribution_rate;

        let tax_recorded = deadlines_for_year(&snapshot.tax_deadlines, year, is_tax_category);
        let contribution_recorded = snapshot
            .inps_contributions
            .iter()
            .filter(|c| c.fiscal_year == year)
            .map(contribution_amount)
            .sum();

        debug!(
            year,
            regime = %self.config.regime,
            %taxable_income,
            %tax_due,
            %contribution_due,
            "tax estimate computed"
        );

        TaxEstimate {
            year,
            regime: self.config.regime.clone(),
            revenue_taxable,
            cost_taxable,
            taxable_income,
            tax_rate: self.config.tax_rate,
            tax_due,
            contribution_base,
            contribution_rate: self.config.contribution_rate,
            contribution_due,
            tax_recorded,
            contribution_recorded,
        }
    }

    /// Flat-rate taxation ignores actual costs.
    fn cost_taxable(
        &self,
        snapshot: &LedgerSnapshot,
        year: i32,
    ) -> Decimal {
        if self.config.regime.is_flat_rate() {
            Decimal::ZERO
        } else {
            costs_for_year(&snapshot.expenses, year)
        }
    }

    fn taxable_income(
        &self,
        revenue: Decimal,
        cost: Decimal,
    ) -> Decimal {
        match self.config.regime {
            TaxRegime::FlatRate => revenue * self.config.coefficient_or_one(),
            TaxRegime::Standard | TaxRegime::Other(_) => revenue - cost,
        }
    }
}
