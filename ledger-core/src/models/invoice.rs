use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub number: String,
    pub issue_date: Option<NaiveDate>,
    pub collection_date: Option<NaiveDate>,
    pub amount: Decimal,
}

impl Invoice {
    /// Date used to attribute the invoice to a fiscal year: the collection
    /// date when known, otherwise the issue date.
    pub fn reference_date(&self) -> Option<NaiveDate> {
        self.collection_date.or(self.issue_date)
    }
}

/// For inserting new invoices (no id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInvoice {
    pub number: String,
    pub issue_date: Option<NaiveDate>,
    pub collection_date: Option<NaiveDate>,
    pub amount: Decimal,
}
