use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    Expense, InpsContribution, Invoice, NewExpense, NewInpsContribution, NewInvoice,
    NewTaxDeadline, TaxConfig, TaxDeadline,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Data-access API consumed by the calculations.
///
/// The `list_*` methods return full snapshots of a record kind; the core
/// never updates or deletes ledger records.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    // Ledger records
    async fn list_invoices(&self) -> Result<Vec<Invoice>, RepositoryError>;
    async fn list_expenses(&self) -> Result<Vec<Expense>, RepositoryError>;
    async fn list_tax_deadlines(&self) -> Result<Vec<TaxDeadline>, RepositoryError>;
    async fn list_inps_contributions(&self) -> Result<Vec<InpsContribution>, RepositoryError>;

    // Tax configuration
    /// Returns [`RepositoryError::NotFound`] when the year is not configured.
    async fn get_tax_config(
        &self,
        fiscal_year: i32,
    ) -> Result<TaxConfig, RepositoryError>;

    /// Stores a configuration. A row already present for the same fiscal
    /// year is left untouched.
    async fn create_tax_config(
        &self,
        config: &TaxConfig,
    ) -> Result<(), RepositoryError>;

    async fn list_tax_config_years(&self) -> Result<Vec<i32>, RepositoryError>;

    // Imports
    async fn insert_invoice(
        &self,
        invoice: &NewInvoice,
    ) -> Result<Invoice, RepositoryError>;

    async fn insert_expense(
        &self,
        expense: &NewExpense,
    ) -> Result<Expense, RepositoryError>;

    async fn insert_tax_deadline(
        &self,
        deadline: &NewTaxDeadline,
    ) -> Result<TaxDeadline, RepositoryError>;

    async fn insert_inps_contribution(
        &self,
        contribution: &NewInpsContribution,
    ) -> Result<InpsContribution, RepositoryError>;
}
