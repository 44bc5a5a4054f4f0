use std::io::Read;

use chrono::NaiveDate;
use clap::ValueEnum;
use ledger_core::{
    LedgerRepository, NewExpense, NewInpsContribution, NewInvoice, NewTaxDeadline,
    RepositoryError,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when importing ledger records.
#[derive(Debug, Error)]
pub enum LedgerLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid date '{value}' in column '{column}' (expected YYYY-MM-DD)")]
    InvalidDate { column: &'static str, value: String },

    #[error("Invalid flag '{0}' (expected true/false, yes/no or 1/0)")]
    InvalidFlag(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for LedgerLoaderError {
    fn from(err: csv::Error) -> Self {
        LedgerLoaderError::CsvParse(err.to_string())
    }
}

/// Which record kind a CSV file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RecordKind {
    Invoices,
    Expenses,
    Deadlines,
    Contributions,
}

/// `number,issue_date,collection_date,amount`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct InvoiceRecord {
    pub number: String,
    pub issue_date: Option<String>,
    pub collection_date: Option<String>,
    pub amount: Decimal,
}

/// `description,expense_date,payment_date,paid,amount`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ExpenseRecord {
    pub description: String,
    pub expense_date: Option<String>,
    pub payment_date: Option<String>,
    pub paid: Option<String>,
    pub amount: Decimal,
}

/// `fiscal_year,category,due_date,estimated_amount,paid_amount`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DeadlineRecord {
    pub fiscal_year: i32,
    pub category: String,
    pub due_date: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub estimated_amount: Option<Decimal>,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub paid_amount: Option<Decimal>,
}

/// `fiscal_year,amount_due,amount_paid`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ContributionRecord {
    pub fiscal_year: i32,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub amount_due: Option<Decimal>,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub amount_paid: Option<Decimal>,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

fn parse_date(
    column: &'static str,
    value: Option<&str>,
) -> Result<Option<NaiveDate>, LedgerLoaderError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| LedgerLoaderError::InvalidDate {
                column,
                value: s.to_string(),
            }),
    }
}

/// Empty cells read as `false`.
fn parse_flag(value: Option<&str>) -> Result<bool, LedgerLoaderError> {
    match value.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("false") | Some("0") | Some("no") => Ok(false),
        Some("true") | Some("1") | Some("yes") => Ok(true),
        Some(other) => Err(LedgerLoaderError::InvalidFlag(other.to_string())),
    }
}

impl TryFrom<&InvoiceRecord> for NewInvoice {
    type Error = LedgerLoaderError;

    fn try_from(record: &InvoiceRecord) -> Result<Self, Self::Error> {
        Ok(NewInvoice {
            number: record.number.clone(),
            issue_date: parse_date("issue_date", record.issue_date.as_deref())?,
            collection_date: parse_date("collection_date", record.collection_date.as_deref())?,
            amount: record.amount,
        })
    }
}

impl TryFrom<&ExpenseRecord> for NewExpense {
    type Error = LedgerLoaderError;

    fn try_from(record: &ExpenseRecord) -> Result<Self, Self::Error> {
        Ok(NewExpense {
            description: record.description.clone(),
            expense_date: parse_date("expense_date", record.expense_date.as_deref())?,
            payment_date: parse_date("payment_date", record.payment_date.as_deref())?,
            paid: parse_flag(record.paid.as_deref())?,
            amount: record.amount,
        })
    }
}

impl TryFrom<&DeadlineRecord> for NewTaxDeadline {
    type Error = LedgerLoaderError;

    fn try_from(record: &DeadlineRecord) -> Result<Self, Self::Error> {
        Ok(NewTaxDeadline {
            fiscal_year: record.fiscal_year,
            category: record.category.clone(),
            due_date: parse_date("due_date", record.due_date.as_deref())?,
            estimated_amount: record.estimated_amount.unwrap_or(Decimal::ZERO),
            paid_amount: record.paid_amount,
        })
    }
}

impl From<&ContributionRecord> for NewInpsContribution {
    fn from(record: &ContributionRecord) -> Self {
        NewInpsContribution {
            fiscal_year: record.fiscal_year,
            amount_due: record.amount_due.unwrap_or(Decimal::ZERO),
            amount_paid: record.amount_paid,
        }
    }
}

/// Imports ledger records from CSV through any [`LedgerRepository`].
///
/// Files need a header row; columns are matched by name and cells are
/// trimmed. Every row of a file is validated before the first insert, so a
/// bad date or flag leaves the store untouched.
pub struct LedgerCsvLoader;

impl LedgerCsvLoader {
    fn parse<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>, LedgerLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: T = result?;
            records.push(record);
        }

        Ok(records)
    }

    pub fn parse_invoices<R: Read>(reader: R) -> Result<Vec<InvoiceRecord>, LedgerLoaderError> {
        Self::parse(reader)
    }

    pub fn parse_expenses<R: Read>(reader: R) -> Result<Vec<ExpenseRecord>, LedgerLoaderError> {
        Self::parse(reader)
    }

    pub fn parse_deadlines<R: Read>(reader: R) -> Result<Vec<DeadlineRecord>, LedgerLoaderError> {
        Self::parse(reader)
    }

    pub fn parse_contributions<R: Read>(
        reader: R
    ) -> Result<Vec<ContributionRecord>, LedgerLoaderError> {
        Self::parse(reader)
    }

    pub async fn load_invoices<R: LedgerRepository + ?Sized>(
        repo: &R,
        records: &[InvoiceRecord],
    ) -> Result<usize, LedgerLoaderError> {
        let invoices = records
            .iter()
            .map(NewInvoice::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        for invoice in &invoices {
            repo.insert_invoice(invoice).await?;
        }

        debug!(count = invoices.len(), "invoices loaded");
        Ok(invoices.len())
    }

    pub async fn load_expenses<R: LedgerRepository + ?Sized>(
        repo: &R,
        records: &[ExpenseRecord],
    ) -> Result<usize, LedgerLoaderError> {
        let expenses = records
            .iter()
            .map(NewExpense::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        for expense in &expenses {
            repo.insert_expense(expense).await?;
        }

        debug!(count = expenses.len(), "expenses loaded");
        Ok(expenses.len())
    }

    pub async fn load_deadlines<R: LedgerRepository + ?Sized>(
        repo: &R,
        records: &[DeadlineRecord],
    ) -> Result<usize, LedgerLoaderError> {
        let deadlines = records
            .iter()
            .map(NewTaxDeadline::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        for deadline in &deadlines {
            repo.insert_tax_deadline(deadline).await?;
        }

        debug!(count = deadlines.len(), "tax deadlines loaded");
        Ok(deadlines.len())
    }

    pub async fn load_contributions<R: LedgerRepository + ?Sized>(
        repo: &R,
        records: &[ContributionRecord],
    ) -> Result<usize, LedgerLoaderError> {
        for record in records {
            repo.insert_inps_contribution(&NewInpsContribution::from(record))
                .await?;
        }

        debug!(count = records.len(), "INPS contributions loaded");
        Ok(records.len())
    }

    /// Parses `reader` as `kind` and loads it; returns the number of rows inserted.
    pub async fn import<R: LedgerRepository + ?Sized, I: Read>(
        repo: &R,
        kind: RecordKind,
        reader: I,
    ) -> Result<usize, LedgerLoaderError> {
        match kind {
            RecordKind::Invoices => Self::load_invoices(repo, &Self::parse_invoices(reader)?).await,
            RecordKind::Expenses => Self::load_expenses(repo, &Self::parse_expenses(reader)?).await,
            RecordKind::Deadlines => {
                Self::load_deadlines(repo, &Self::parse_deadlines(reader)?).await
            }
            RecordKind::Contributions => {
                Self::load_contributions(repo, &Self::parse_contributions(reader)?).await
            }
        }
    }
}
