//! Pure computations over a [`crate::LedgerSnapshot`].
//!
//! Neither calculator performs I/O; both are infallible and return values
//! without rounding.

pub mod balance;
pub mod common;
pub mod tax_estimate;

pub use balance::{
    BalanceBuilder, BalanceInput, BalanceSection, BalanceSheet, BalanceSheetRow, IncomeStatement,
    Indicators, ManagementBalance, StatementRow,
};
pub use common::RowValue;
pub use tax_estimate::{TaxEstimate, TaxEstimator};
