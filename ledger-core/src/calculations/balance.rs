//! Management balance: balance sheet, income statement and indicators.
//!
//! The management view mixes two time bases:
//!
//! | Statement         | Time base                                   |
//! |-------------------|---------------------------------------------|
//! | Income statement  | fiscal `year`, by record reference date     |
//! | Balance sheet     | position as of `ref_date`                   |
//! | Indicators        | derived from the two statements above       |
//!
//! Cash is not derived from the ledger; the caller supplies it.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use ledger_core::calculations::{BalanceBuilder, BalanceInput};
//! use ledger_core::{Invoice, LedgerSnapshot};
//!
//! let snapshot = LedgerSnapshot {
//!     invoices: vec![Invoice {
//!         id: 1,
//!         number: "2025/001".to_string(),
//!         issue_date: NaiveDate::from_ymd_opt(2025, 3, 1),
//!         collection_date: None,
//!         amount: dec!(1000),
//!     }],
//!     ..Default::default()
//! };
//!
//! let input = BalanceInput {
//!     year: 2025,
//!     ref_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
//!     cash_balance: dec!(500),
//! };
//!
//! let balance = BalanceBuilder::new(&snapshot).build(&input);
//!
//! assert_eq!(balance.income_statement.revenue, dec!(1000));
//! assert_eq!(balance.balance_sheet.accounts_receivable, dec!(1000));
//! assert_eq!(balance.balance_sheet.equity, dec!(1500));
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::LedgerSnapshot;
use crate::calculations::common::{
    costs_for_year, deadlines_for_year, is_contribution_category, is_tax_category, max,
    percent_of, revenue_for_year,
};

/// Parameters of one management balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceInput {
    /// Fiscal year of the income statement.
    pub year: i32,
    /// Date of the balance-sheet position.
    pub ref_date: NaiveDate,
    /// Cash on hand at `ref_date`; negative for an overdraft.
    pub cash_balance: Decimal,
}

/// Section of a balance-sheet row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceSection {
    Assets,
    Liabilities,
    Equity,
}

impl BalanceSection {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Assets => "Assets",
            Self::Liabilities => "Liabilities",
            Self::Equity => "Equity",
        }
    }
}

/// One labelled value of a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementRow {
    pub label: &'static str,
    pub amount: Decimal,
}

/// One labelled value of the balance sheet, tagged with its section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceSheetRow {
    pub section: BalanceSection,
    pub label: &'static str,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub revenue: Decimal,
    pub operating_costs: Decimal,
    pub taxes: Decimal,
    pub contributions: Decimal,
    pub gross_profit: Decimal,
    pub net_profit: Decimal,
}

impl IncomeStatement {
    /// Display rows in fixed order; costs, taxes and contributions negated.
    pub fn rows(&self) -> Vec<StatementRow> {
        vec![
            StatementRow {
                label: "Revenue",
                amount: self.revenue,
            },
            StatementRow {
                label: "Operating costs",
                amount: -self.operating_costs,
            },
            StatementRow {
                label: "Taxes",
                amount: -self.taxes,
            },
            StatementRow {
                label: "Contributions",
                amount: -self.contributions,
            },
            StatementRow {
                label: "Net profit",
                amount: self.net_profit,
            },
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub cash: Decimal,
    pub accounts_receivable: Decimal,
    pub accounts_payable: Decimal,
    pub tax_liabilities: Decimal,
    pub total_assets: Decimal,
    pub total_liabilities: Decimal,
    pub equity: Decimal,
}

impl BalanceSheet {
    pub fn rows(&self) -> Vec<BalanceSheetRow> {
        vec![
            BalanceSheetRow {
                section: BalanceSection::Assets,
                label: "Cash",
                amount: self.cash,
            },
            BalanceSheetRow {
                section: BalanceSection::Assets,
                label: "Accounts receivable",
                amount: self.accounts_receivable,
            },
            BalanceSheetRow {
                section: BalanceSection::Liabilities,
                label: "Accounts payable",
                amount: self.accounts_payable,
            },
            BalanceSheetRow {
                section: BalanceSection::Liabilities,
                label: "Tax and contribution liabilities",
                amount: self.tax_liabilities,
            },
            BalanceSheetRow {
                section: BalanceSection::Equity,
                label: "Equity",
                amount: self.equity,
            },
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicators {
    pub revenue: Decimal,
    pub operating_costs: Decimal,
    pub gross_margin: Decimal,
    /// Gross margin as a percentage of revenue; 0 when revenue ≤ 0.
    pub gross_margin_pct: Decimal,
    pub taxes_and_contributions: Decimal,
    /// Taxes plus contributions as a percentage of revenue; 0 when revenue ≤ 0.
    pub tax_burden_pct: Decimal,
    pub net_profit: Decimal,
    pub net_working_capital: Decimal,
    /// Liabilities minus cash.
    pub net_financial_position: Decimal,
}

impl Indicators {
    pub fn rows(&self) -> Vec<StatementRow> {
        vec![
            StatementRow {
                label: "Revenue",
                amount: self.revenue,
            },
            StatementRow {
                label: "Operating costs",
                amount: self.operating_costs,
            },
            StatementRow {
                label: "Gross margin",
                amount: self.gross_margin,
            },
            StatementRow {
                label: "Gross margin %",
                amount: self.gross_margin_pct,
            },
            StatementRow {
                label: "Taxes and contributions",
                amount: self.taxes_and_contributions,
            },
            StatementRow {
                label: "Tax burden %",
                amount: self.tax_burden_pct,
            },
            StatementRow {
                label: "Net profit",
                amount: self.net_profit,
            },
            StatementRow {
                label: "Net working capital",
                amount: self.net_working_capital,
            },
            StatementRow {
                label: "Net financial position",
                amount: self.net_financial_position,
            },
        ]
    }
}

/// Result of [`BalanceBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagementBalance {
    pub balance_sheet: BalanceSheet,
    pub income_statement: IncomeStatement,
    pub indicators: Indicators,
}

/// Builds the management balance from a ledger snapshot.
#[derive(Debug, Clone)]
pub struct BalanceBuilder<'a> {
    snapshot: &'a LedgerSnapshot,
}

impl<'a> BalanceBuilder<'a> {
    pub fn new(snapshot: &'a LedgerSnapshot) -> Self {
        Self { snapshot }
    }

    /// Computes the three statements. Never fails: missing dates and
    /// amounts exclude a record or count as zero.
    pub fn build(
        &self,
        input: &BalanceInput,
    ) -> ManagementBalance {
        let income_statement = self.income_statement(input.year);
        let balance_sheet = self.balance_sheet(input.ref_date, input.cash_balance);
        let indicators = self.indicators(&income_statement, &balance_sheet);

        debug!(
            year = input.year,
            ref_date = %input.ref_date,
            revenue = %income_statement.revenue,
            net_profit = %income_statement.net_profit,
            equity = %balance_sheet.equity,
            "management balance built"
        );

        ManagementBalance {
            balance_sheet,
            income_statement,
            indicators,
        }
    }

    fn income_statement(
        &self,
        year: i32,
    ) -> IncomeStatement {
        let revenue = revenue_for_year(&self.snapshot.invoices, year);
        let operating_costs = costs_for_year(&self.snapshot.expenses, year);

        // The two filters are independent; a category naming both is
        // counted in both buckets.
        let taxes = deadlines_for_year(&self.snapshot.tax_deadlines, year, is_tax_category);
        let contributions =
            deadlines_for_year(&self.snapshot.tax_deadlines, year, is_contribution_category);

        let gross_profit = revenue - operating_costs;
        let net_profit = gross_profit - taxes - contributions;

        IncomeStatement {
            revenue,
            operating_costs,
            taxes,
            contributions,
            gross_profit,
            net_profit,
        }
    }

    fn balance_sheet(
        &self,
        ref_date: NaiveDate,
        cash: Decimal,
    ) -> BalanceSheet {
        let accounts_receivable = self.accounts_receivable(ref_date);
        let accounts_payable = self.accounts_payable(ref_date);
        let tax_liabilities = self.residual_tax_liabilities(ref_date);

        let total_assets = cash + accounts_receivable;
        let total_liabilities = accounts_payable + tax_liabilities;

        BalanceSheet {
            cash,
            accounts_receivable,
            accounts_payable,
            tax_liabilities,
            total_assets,
            total_liabilities,
            equity: total_assets - total_liabilities,
        }
    }

    /// Invoices issued on or before `ref_date` and not yet collected at that date.
    fn accounts_receivable(
        &self,
        ref_date: NaiveDate,
    ) -> Decimal {
        self.snapshot
            .invoices
            .iter()
            .filter(|inv| {
                inv.issue_date.is_some_and(|issued| issued <= ref_date)
                    && inv.collection_date.is_none_or(|collected| collected > ref_date)
            })
            .map(|inv| inv.amount)
            .sum()
    }

    /// Expenses incurred on or before `ref_date` and not settled at that date.
    fn accounts_payable(
        &self,
        ref_date: NaiveDate,
    ) -> Decimal {
        self.snapshot
            .expenses
            .iter()
            .filter(|exp| {
                if exp.paid && exp.payment_date.is_none() {
                    warn!(expense_id = exp.id, "expense marked paid without a payment date");
                }
                let settled = exp.paid && exp.payment_date.is_some_and(|paid| paid <= ref_date);
                exp.expense_date.is_some_and(|incurred| incurred <= ref_date) && !settled
            })
            .map(|exp| exp.amount)
            .sum()
    }

    /// Unpaid share of deadlines falling strictly after `ref_date`, floored
    /// at zero per deadline.
    fn residual_tax_liabilities(
        &self,
        ref_date: NaiveDate,
    ) -> Decimal {
        self.snapshot
            .tax_deadlines
            .iter()
            .filter(|d| d.due_date.is_some_and(|due| due > ref_date))
            .map(|d| {
                let paid = d.paid_amount.unwrap_or(Decimal::ZERO);
                max(d.estimated_amount - paid, Decimal::ZERO)
            })
            .sum()
    }

    fn indicators(
        &self,
        income: &IncomeStatement,
        sheet: &BalanceSheet,
    ) -> Indicators {
        let taxes_and_contributions = income.taxes + income.contributions;

        Indicators {
            revenue: income.revenue,
            operating_costs: income.operating_costs,
            gross_margin: income.gross_profit,
            gross_margin_pct: percent_of(income.gross_profit, income.revenue),
            taxes_and_contributions,
            tax_burden_pct: percent_of(taxes_and_contributions, income.revenue),
            net_profit: income.net_profit,
            net_working_capital: sheet.total_assets - sheet.total_liabilities,
            net_financial_position: sheet.total_liabilities - sheet.cash,
        }
    }
}
