//! In-memory [`LedgerRepository`] for unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::repository::{LedgerRepository, RepositoryError};
use crate::models::{
    Expense, InpsContribution, Invoice, LedgerSnapshot, NewExpense, NewInpsContribution,
    NewInvoice, NewTaxDeadline, TaxConfig, TaxDeadline,
};

#[derive(Default)]
pub(crate) struct MemoryRepository {
    snapshot: Mutex<LedgerSnapshot>,
    configs: Mutex<Vec<TaxConfig>>,
    config_writes: AtomicUsize,
    fail_reads: bool,
}

impl MemoryRepository {
    pub(crate) fn with_snapshot(snapshot: LedgerSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
            ..Default::default()
        }
    }

    /// Every read fails with a database error.
    pub(crate) fn failing() -> Self {
        Self {
            fail_reads: true,
            ..Default::default()
        }
    }

    pub(crate) fn with_config(
        self,
        config: TaxConfig,
    ) -> Self {
        self.configs.lock().unwrap().push(config);
        self
    }

    /// Number of `create_tax_config` calls received.
    pub(crate) fn config_writes(&self) -> usize {
        self.config_writes.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.fail_reads {
            return Err(RepositoryError::Database("disk I/O error".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerRepository for MemoryRepository {
    async fn list_invoices(&self) -> Result<Vec<Invoice>, RepositoryError> {
        self.check()?;
        Ok(self.snapshot.lock().unwrap().invoices.clone())
    }

    async fn list_expenses(&self) -> Result<Vec<Expense>, RepositoryError> {
        self.check()?;
        Ok(self.snapshot.lock().unwrap().expenses.clone())
    }

    async fn list_tax_deadlines(&self) -> Result<Vec<TaxDeadline>, RepositoryError> {
        self.check()?;
        Ok(self.snapshot.lock().unwrap().tax_deadlines.clone())
    }

    async fn list_inps_contributions(&self) -> Result<Vec<InpsContribution>, RepositoryError> {
        self.check()?;
        Ok(self.snapshot.lock().unwrap().inps_contributions.clone())
    }

    async fn get_tax_config(
        &self,
        fiscal_year: i32,
    ) -> Result<TaxConfig, RepositoryError> {
        self.check()?;
        self.configs
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.fiscal_year == fiscal_year)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn create_tax_config(
        &self,
        config: &TaxConfig,
    ) -> Result<(), RepositoryError> {
        self.config_writes.fetch_add(1, Ordering::SeqCst);
        let mut configs = self.configs.lock().unwrap();
        if !configs.iter().any(|c| c.fiscal_year == config.fiscal_year) {
            configs.push(config.clone());
        }
        Ok(())
    }

    async fn list_tax_config_years(&self) -> Result<Vec<i32>, RepositoryError> {
        self.check()?;
        let mut years: Vec<_> = self.configs.lock().unwrap().iter().map(|c| c.fiscal_year).collect();
        years.sort_unstable_by(|a, b| b.cmp(a));
        Ok(years)
    }

    async fn insert_invoice(
        &self,
        invoice: &NewInvoice,
    ) -> Result<Invoice, RepositoryError> {
        let mut snapshot = self.snapshot.lock().unwrap();
        let created = Invoice {
            id: snapshot.invoices.len() as i64 + 1,
            number: invoice.number.clone(),
            issue_date: invoice.issue_date,
            collection_date: invoice.collection_date,
            amount: invoice.amount,
        };
        snapshot.invoices.push(created.clone());
        Ok(created)
    }

    async fn insert_expense(
        &self,
        expense: &NewExpense,
    ) -> Result<Expense, RepositoryError> {
        let mut snapshot = self.snapshot.lock().unwrap();
        let created = Expense {
            id: snapshot.expenses.len() as i64 + 1,
            description: expense.description.clone(),
            expense_date: expense.expense_date,
            payment_date: expense.payment_date,
            paid: expense.paid,
            amount: expense.amount,
        };
        snapshot.expenses.push(created.clone());
        Ok(created)
    }

    async fn insert_tax_deadline(
        &self,
        deadline: &NewTaxDeadline,
    ) -> Result<TaxDeadline, RepositoryError> {
        let mut snapshot = self.snapshot.lock().unwrap();
        let created = TaxDeadline {
            id: snapshot.tax_deadlines.len() as i64 + 1,
            fiscal_year: deadline.fiscal_year,
            category: deadline.category.clone(),
            due_date: deadline.due_date,
            estimated_amount: deadline.estimated_amount,
            paid_amount: deadline.paid_amount,
        };
        snapshot.tax_deadlines.push(created.clone());
        Ok(created)
    }

    async fn insert_inps_contribution(
        &self,
        contribution: &NewInpsContribution,
    ) -> Result<InpsContribution, RepositoryError> {
        let mut snapshot = self.snapshot.lock().unwrap();
        let created = InpsContribution {
            id: snapshot.inps_contributions.len() as i64 + 1,
            fiscal_year: contribution.fiscal_year,
            amount_due: contribution.amount_due,
            amount_paid: contribution.amount_paid,
        };
        snapshot.inps_contributions.push(created.clone());
        Ok(created)
    }
}
