//! Typed column access for `SqliteRow`.
//!
//! SQLite stores whatever it is given, so an amount column may hold an
//! INTEGER, a REAL or NULL depending on how the row was written.

use chrono::NaiveDate;
use ledger_core::RepositoryError;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, TypeInfo, ValueRef};

fn column_error(
    column: &str,
    e: sqlx::Error,
) -> RepositoryError {
    RepositoryError::Database(format!("Failed to read column '{}': {}", column, e))
}

/// Reads any plain column type (ids, years, text, flags).
pub fn get<'r, T>(
    row: &'r SqliteRow,
    column: &str,
) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column).map_err(|e| column_error(column, e))
}

/// Reads an amount stored as INTEGER or REAL. NULL reads as zero.
pub fn get_decimal(
    row: &SqliteRow,
    column: &str,
) -> Result<Decimal, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{}' not found: {}", column, e)))?;

    let type_name = value_ref.type_info().name().to_string();

    match type_name.as_str() {
        "NULL" => Ok(Decimal::ZERO),
        "INTEGER" => get::<i64>(row, column).map(Decimal::from),
        "REAL" => {
            let val: f64 = get(row, column)?;
            Decimal::try_from(val).map_err(|e| {
                RepositoryError::Database(format!("Failed to convert {} to Decimal: {}", val, e))
            })
        }
        other => Err(RepositoryError::Database(format!(
            "Unexpected type '{}' for column '{}'",
            other, column
        ))),
    }
}

/// Like [`get_decimal`], but NULL reads as `None`.
pub fn get_optional_decimal(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<Decimal>, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{}' not found: {}", column, e)))?;

    if value_ref.is_null() {
        return Ok(None);
    }

    get_decimal(row, column).map(Some)
}

/// Reads an optional `YYYY-MM-DD` date. Empty text reads as `None`.
pub fn get_optional_date(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<NaiveDate>, RepositoryError> {
    let text: Option<String> = get(row, column)?;

    match text.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map(Some).map_err(|e| {
            RepositoryError::Database(format!("Invalid date '{}' in column '{}': {}", s, column, e))
        }),
    }
}

/// Formats a date for storage.
pub fn date_to_text(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

/// Converts an amount to f64 for storage.
pub fn decimal_to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}
