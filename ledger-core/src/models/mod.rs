mod expense;
mod inps_contribution;
mod invoice;
mod snapshot;
mod tax_config;
mod tax_deadline;

pub use expense::{Expense, NewExpense};
pub use inps_contribution::{InpsContribution, NewInpsContribution};
pub use invoice::{Invoice, NewInvoice};
pub use snapshot::LedgerSnapshot;
pub use tax_config::{TaxConfig, TaxRegime};
pub use tax_deadline::{NewTaxDeadline, TaxDeadline};
