use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub description: String,
    pub expense_date: Option<NaiveDate>,
    pub payment_date: Option<NaiveDate>,
    /// Payment completed. Expected to come with a `payment_date`, but the
    /// pairing is not enforced.
    pub paid: bool,
    pub amount: Decimal,
}

impl Expense {
    /// Payment date when known, otherwise the expense date.
    pub fn reference_date(&self) -> Option<NaiveDate> {
        self.payment_date.or(self.expense_date)
    }
}

/// For inserting new expenses (no id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    pub description: String,
    pub expense_date: Option<NaiveDate>,
    pub payment_date: Option<NaiveDate>,
    pub paid: bool,
    pub amount: Decimal,
}
