use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use ledger_core::{
    Expense, InpsContribution, Invoice, LedgerRepository, NewExpense, NewInpsContribution,
    NewInvoice, NewTaxDeadline, RepositoryError, TaxConfig, TaxDeadline, TaxRegime,
};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use tracing::debug;

use crate::columns::{
    date_to_text, decimal_to_f64, get, get_decimal, get_optional_date, get_optional_decimal,
};

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Executes every `*.sql` file in `seeds_dir`, in filename order.
    pub async fn run_seeds(
        &self,
        seeds_dir: &Path,
    ) -> Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir(seeds_dir)
            .with_context(|| format!("Failed to read seeds directory '{}'", seeds_dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sql"))
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let sql = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;

            sqlx::raw_sql(&sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to execute seed file '{}'", path.display()))?;

            debug!(seed = %path.display(), "seed file applied");
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn row_to_invoice(row: &SqliteRow) -> Result<Invoice, RepositoryError> {
    Ok(Invoice {
        id: get(row, "id")?,
        number: get(row, "number")?,
        issue_date: get_optional_date(row, "issue_date")?,
        collection_date: get_optional_date(row, "collection_date")?,
        amount: get_decimal(row, "amount")?,
    })
}

fn row_to_expense(row: &SqliteRow) -> Result<Expense, RepositoryError> {
    Ok(Expense {
        id: get(row, "id")?,
        description: get(row, "description")?,
        expense_date: get_optional_date(row, "expense_date")?,
        payment_date: get_optional_date(row, "payment_date")?,
        paid: get(row, "paid")?,
        amount: get_decimal(row, "amount")?,
    })
}

fn row_to_tax_deadline(row: &SqliteRow) -> Result<TaxDeadline, RepositoryError> {
    Ok(TaxDeadline {
        id: get(row, "id")?,
        fiscal_year: get(row, "fiscal_year")?,
        category: get(row, "category")?,
        due_date: get_optional_date(row, "due_date")?,
        estimated_amount: get_decimal(row, "estimated_amount")?,
        paid_amount: get_optional_decimal(row, "paid_amount")?,
    })
}

fn row_to_inps_contribution(row: &SqliteRow) -> Result<InpsContribution, RepositoryError> {
    Ok(InpsContribution {
        id: get(row, "id")?,
        fiscal_year: get(row, "fiscal_year")?,
        amount_due: get_decimal(row, "amount_due")?,
        amount_paid: get_optional_decimal(row, "amount_paid")?,
    })
}

fn row_to_tax_config(row: &SqliteRow) -> Result<TaxConfig, RepositoryError> {
    let regime: String = get(row, "regime")?;

    Ok(TaxConfig {
        fiscal_year: get(row, "fiscal_year")?,
        regime: TaxRegime::parse(&regime),
        tax_rate: get_decimal(row, "tax_rate")?,
        contribution_rate: get_decimal(row, "contribution_rate")?,
        profitability_coefficient: get_optional_decimal(row, "profitability_coefficient")?,
    })
}

#[async_trait]
impl LedgerRepository for SqliteRepository {
    async fn list_invoices(&self) -> Result<Vec<Invoice>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, number, issue_date, collection_date, amount FROM invoices ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_invoice).collect()
    }

    async fn list_expenses(&self) -> Result<Vec<Expense>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, description, expense_date, payment_date, paid, amount
             FROM expenses ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_expense).collect()
    }

    async fn list_tax_deadlines(&self) -> Result<Vec<TaxDeadline>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, fiscal_year, category, due_date, estimated_amount, paid_amount
             FROM tax_deadlines ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_tax_deadline).collect()
    }

    async fn list_inps_contributions(&self) -> Result<Vec<InpsContribution>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, fiscal_year, amount_due, amount_paid FROM inps_contributions ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_inps_contribution).collect()
    }

    async fn get_tax_config(
        &self,
        fiscal_year: i32,
    ) -> Result<TaxConfig, RepositoryError> {
        let row = sqlx::query(
            "SELECT fiscal_year, regime, tax_rate, contribution_rate, profitability_coefficient
             FROM tax_config WHERE fiscal_year = ?",
        )
        .bind(fiscal_year)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or(RepositoryError::NotFound)?;

        row_to_tax_config(&row)
    }

    async fn create_tax_config(
        &self,
        config: &TaxConfig,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO tax_config
                (fiscal_year, regime, tax_rate, contribution_rate, profitability_coefficient)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(config.fiscal_year)
        .bind(config.regime.as_str())
        .bind(decimal_to_f64(config.tax_rate))
        .bind(decimal_to_f64(config.contribution_rate))
        .bind(config.profitability_coefficient.map(decimal_to_f64))
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            debug!(fiscal_year = config.fiscal_year, "tax configuration already present");
        }

        Ok(())
    }

    async fn list_tax_config_years(&self) -> Result<Vec<i32>, RepositoryError> {
        let rows = sqlx::query("SELECT fiscal_year FROM tax_config ORDER BY fiscal_year DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.iter().map(|row| get(row, "fiscal_year")).collect()
    }

    async fn insert_invoice(
        &self,
        invoice: &NewInvoice,
    ) -> Result<Invoice, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO invoices (number, issue_date, collection_date, amount)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&invoice.number)
        .bind(date_to_text(invoice.issue_date))
        .bind(date_to_text(invoice.collection_date))
        .bind(decimal_to_f64(invoice.amount))
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(Invoice {
            id: result.last_insert_rowid(),
            number: invoice.number.clone(),
            issue_date: invoice.issue_date,
            collection_date: invoice.collection_date,
            amount: invoice.amount,
        })
    }

    async fn insert_expense(
        &self,
        expense: &NewExpense,
    ) -> Result<Expense, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO expenses (description, expense_date, payment_date, paid, amount)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&expense.description)
        .bind(date_to_text(expense.expense_date))
        .bind(date_to_text(expense.payment_date))
        .bind(expense.paid)
        .bind(decimal_to_f64(expense.amount))
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(Expense {
            id: result.last_insert_rowid(),
            description: expense.description.clone(),
            expense_date: expense.expense_date,
            payment_date: expense.payment_date,
            paid: expense.paid,
            amount: expense.amount,
        })
    }

    async fn insert_tax_deadline(
        &self,
        deadline: &NewTaxDeadline,
    ) -> Result<TaxDeadline, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO tax_deadlines (fiscal_year, category, due_date, estimated_amount, paid_amount)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(deadline.fiscal_year)
        .bind(&deadline.category)
        .bind(date_to_text(deadline.due_date))
        .bind(decimal_to_f64(deadline.estimated_amount))
        .bind(deadline.paid_amount.map(decimal_to_f64))
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(TaxDeadline {
            id: result.last_insert_rowid(),
            fiscal_year: deadline.fiscal_year,
            category: deadline.category.clone(),
            due_date: deadline.due_date,
            estimated_amount: deadline.estimated_amount,
            paid_amount: deadline.paid_amount,
        })
    }

    async fn insert_inps_contribution(
        &self,
        contribution: &NewInpsContribution,
    ) -> Result<InpsContribution, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO inps_contributions (fiscal_year, amount_due, amount_paid) VALUES (?, ?, ?)",
        )
        .bind(contribution.fiscal_year)
        .bind(decimal_to_f64(contribution.amount_due))
        .bind(contribution.amount_paid.map(decimal_to_f64))
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(InpsContribution {
            id: result.last_insert_rowid(),
            fiscal_year: contribution.fiscal_year,
            amount_due: contribution.amount_due,
            amount_paid: contribution.amount_paid,
        })
    }
}
