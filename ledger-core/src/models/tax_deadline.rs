use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxDeadline {
    pub id: i64,
    pub fiscal_year: i32,
    /// Free-text label, e.g. "IRPEF balance" or "INPS advance".
    pub category: String,
    pub due_date: Option<NaiveDate>,
    pub estimated_amount: Decimal,
    pub paid_amount: Option<Decimal>,
}

/// For inserting new tax deadlines (no id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTaxDeadline {
    pub fiscal_year: i32,
    pub category: String,
    pub due_date: Option<NaiveDate>,
    pub estimated_amount: Decimal,
    pub paid_amount: Option<Decimal>,
}
