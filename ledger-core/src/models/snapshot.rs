use serde::{Deserialize, Serialize};

use super::{Expense, InpsContribution, Invoice, TaxDeadline};

/// Every record the calculations read, captured once per computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub invoices: Vec<Invoice>,
    pub expenses: Vec<Expense>,
    pub tax_deadlines: Vec<TaxDeadline>,
    pub inps_contributions: Vec<InpsContribution>,
}
