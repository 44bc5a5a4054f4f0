//! Common helpers shared by the balance builder and the tax estimator.
//!
//! This module holds the rules both computations must agree on: how a
//! record is attributed to a fiscal year, which amount of a partially paid
//! record counts, and how free-text deadline categories are classified.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Expense, InpsContribution, Invoice, TaxDeadline};

/// Category fragments that mark a deadline as income tax.
pub const TAX_CATEGORY_PATTERNS: &[&str] = &["tax", "irpef", "withholding"];

/// Category fragments that mark a deadline as social-security contribution.
pub const CONTRIBUTION_CATEGORY_PATTERNS: &[&str] =
    &["inps", "social-security", "social security"];

/// Display value of a labelled result row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowValue {
    Integer(i64),
    Text(String),
    Amount(Decimal),
    /// A fraction such as 0.15; rendered as a percentage.
    Rate(Decimal),
}

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero. The calculations in
/// this crate never round; this is meant for presentation.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use ledger_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Returns `numerator / denominator * 100`, or zero when the denominator
/// is not positive.
///
/// A result beyond the `Decimal` range saturates to `Decimal::MAX` or
/// `Decimal::MIN`, following the sign of the numerator.
pub fn percent_of(
    numerator: Decimal,
    denominator: Decimal,
) -> Decimal {
    if denominator <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    numerator
        .checked_div(denominator)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(if numerator.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        })
}

fn in_year(
    date: Option<NaiveDate>,
    year: i32,
) -> bool {
    date.is_some_and(|d| d.year() == year)
}

/// Sum of invoice amounts whose reference date falls in `year`.
pub fn revenue_for_year(
    invoices: &[Invoice],
    year: i32,
) -> Decimal {
    invoices
        .iter()
        .filter(|inv| in_year(inv.reference_date(), year))
        .map(|inv| inv.amount)
        .sum()
}

/// Sum of expense amounts whose reference date falls in `year`.
pub fn costs_for_year(
    expenses: &[Expense],
    year: i32,
) -> Decimal {
    expenses
        .iter()
        .filter(|exp| in_year(exp.reference_date(), year))
        .map(|exp| exp.amount)
        .sum()
}

fn matches_any(
    category: &str,
    patterns: &[&str],
) -> bool {
    let lowered = category.to_lowercase();
    patterns.iter().any(|p| lowered.contains(p))
}

/// True when the deadline category names an income-tax payment.
pub fn is_tax_category(category: &str) -> bool {
    matches_any(category, TAX_CATEGORY_PATTERNS)
}

/// True when the deadline category names a social-security payment.
///
/// Independent of [`is_tax_category`]: a label such as "tax INPS" matches both.
pub fn is_contribution_category(category: &str) -> bool {
    matches_any(category, CONTRIBUTION_CATEGORY_PATTERNS)
}

/// Paid amount when present and non-zero, else `fallback`.
fn paid_or(
    paid: Option<Decimal>,
    fallback: Decimal,
) -> Decimal {
    match paid {
        Some(amount) if !amount.is_zero() => amount,
        _ => fallback,
    }
}

/// Amount a deadline contributes to the year's expense.
pub fn deadline_amount(deadline: &TaxDeadline) -> Decimal {
    paid_or(deadline.paid_amount, deadline.estimated_amount)
}

/// Amount a contribution record counts as recorded.
pub fn contribution_amount(contribution: &InpsContribution) -> Decimal {
    paid_or(contribution.amount_paid, contribution.amount_due)
}

/// Sum of [`deadline_amount`] over deadlines of `year` accepted by `filter`.
pub fn deadlines_for_year(
    deadlines: &[TaxDeadline],
    year: i32,
    filter: impl Fn(&str) -> bool,
) -> Decimal {
    deadlines
        .iter()
        .filter(|d| d.fiscal_year == year && filter(&d.category))
        .map(deadline_amount)
        .sum()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn date(
        y: i32,
        m: u32,
        d: u32,
    ) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn invoice(
        issue: Option<NaiveDate>,
        collection: Option<NaiveDate>,
        amount: Decimal,
    ) -> Invoice {
        Invoice {
            id: 0,
            number: String::new(),
            issue_date: issue,
            collection_date: collection,
            amount,
        }
    }

    fn deadline(
        category: &str,
        estimated: Decimal,
        paid: Option<Decimal>,
    ) -> TaxDeadline {
        TaxDeadline {
            id: 0,
            fiscal_year: 2025,
            category: category.to_string(),
            due_date: date(2025, 6, 30),
            estimated_amount: estimated,
            paid_amount: paid,
        }
    }

    // =========================================================================
    // round_half_up / max / percent_of
    // =========================================================================

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
    }

    #[test]
    fn round_half_up_handles_negative_values() {
        assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
    }

    #[test]
    fn round_half_up_handles_large_values() {
        assert_eq!(round_half_up(dec!(999999.999)), dec!(1000000.00));
    }

    #[test]
    fn max_handles_negative_and_positive() {
        assert_eq!(max(dec!(-50.00), dec!(50.00)), dec!(50.00));
    }

    #[test]
    fn percent_of_divides_and_scales() {
        assert_eq!(percent_of(dec!(25), dec!(200)), dec!(12.5));
    }

    #[test]
    fn percent_of_is_zero_for_zero_denominator() {
        assert_eq!(percent_of(dec!(-4000), dec!(0)), dec!(0));
    }

    #[test]
    fn percent_of_saturates_instead_of_overflowing() {
        let tiny = dec!(0.0000001);

        assert_eq!(percent_of(dec!(-10000000000000000000000), tiny), Decimal::MIN);
        assert_eq!(percent_of(dec!(10000000000000000000000), tiny), Decimal::MAX);
        assert_eq!(percent_of(Decimal::MAX, dec!(1)), Decimal::MAX);
    }

    #[test]
    fn percent_of_is_zero_for_negative_denominator() {
        assert_eq!(percent_of(dec!(100), dec!(-10)), dec!(0));
    }

    // =========================================================================
    // year attribution
    // =========================================================================

    #[test]
    fn revenue_prefers_collection_date_over_issue_date() {
        let invoices = vec![
            invoice(date(2024, 12, 20), date(2025, 1, 15), dec!(1000)),
            invoice(date(2025, 3, 1), None, dec!(500)),
        ];

        assert_eq!(revenue_for_year(&invoices, 2025), dec!(1500));
        assert_eq!(revenue_for_year(&invoices, 2024), dec!(0));
    }

    #[test]
    fn revenue_excludes_invoices_without_dates() {
        let invoices = vec![invoice(None, None, dec!(999))];

        assert_eq!(revenue_for_year(&invoices, 2025), dec!(0));
    }

    #[test]
    fn costs_prefer_payment_date_over_expense_date() {
        let expenses = vec![
            Expense {
                id: 1,
                description: "rent".to_string(),
                expense_date: date(2024, 12, 1),
                payment_date: date(2025, 1, 5),
                paid: true,
                amount: dec!(800),
            },
            Expense {
                id: 2,
                description: "fuel".to_string(),
                expense_date: date(2025, 2, 1),
                payment_date: None,
                paid: false,
                amount: dec!(60),
            },
            Expense {
                id: 3,
                description: "undated".to_string(),
                expense_date: None,
                payment_date: None,
                paid: false,
                amount: dec!(40),
            },
        ];

        assert_eq!(costs_for_year(&expenses, 2025), dec!(860));
    }

    // =========================================================================
    // categories and effective amounts
    // =========================================================================

    #[test]
    fn tax_category_matches_case_insensitively() {
        assert!(is_tax_category("IRPEF saldo"));
        assert!(is_tax_category("Flat Tax advance"));
        assert!(!is_tax_category("INPS advance"));
    }

    #[test]
    fn contribution_category_matches_inps_and_social_security() {
        assert!(is_contribution_category("INPS first advance"));
        assert!(is_contribution_category("Social-Security balance"));
        assert!(!is_contribution_category("IRPEF saldo"));
    }

    #[test]
    fn category_naming_both_matches_both_lists() {
        let label = "Tax and INPS";

        assert!(is_tax_category(label));
        assert!(is_contribution_category(label));
    }

    #[test]
    fn deadline_amount_prefers_non_zero_paid_amount() {
        assert_eq!(deadline_amount(&deadline("tax", dec!(100), Some(dec!(90)))), dec!(90));
    }

    #[test]
    fn deadline_amount_falls_back_when_paid_is_zero_or_missing() {
        assert_eq!(deadline_amount(&deadline("tax", dec!(100), Some(dec!(0)))), dec!(100));
        assert_eq!(deadline_amount(&deadline("tax", dec!(100), None)), dec!(100));
    }

    #[test]
    fn contribution_amount_prefers_paid_amount() {
        let paid = InpsContribution {
            id: 1,
            fiscal_year: 2025,
            amount_due: dec!(2000),
            amount_paid: Some(dec!(1800)),
        };
        let unpaid = InpsContribution {
            amount_paid: None,
            ..paid.clone()
        };

        assert_eq!(contribution_amount(&paid), dec!(1800));
        assert_eq!(contribution_amount(&unpaid), dec!(2000));
    }

    #[test]
    fn deadlines_for_year_filters_year_and_category() {
        let mut other_year = deadline("IRPEF", dec!(300), None);
        other_year.fiscal_year = 2024;
        let deadlines = vec![
            deadline("IRPEF", dec!(100), None),
            deadline("INPS", dec!(50), None),
            other_year,
        ];

        assert_eq!(deadlines_for_year(&deadlines, 2025, is_tax_category), dec!(100));
        assert_eq!(
            deadlines_for_year(&deadlines, 2025, is_contribution_category),
            dec!(50)
        );
    }
}
