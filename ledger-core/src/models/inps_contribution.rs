use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InpsContribution {
    pub id: i64,
    pub fiscal_year: i32,
    pub amount_due: Decimal,
    pub amount_paid: Option<Decimal>,
}

/// For inserting new contribution records (no id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInpsContribution {
    pub fiscal_year: i32,
    pub amount_due: Decimal,
    pub amount_paid: Option<Decimal>,
}
