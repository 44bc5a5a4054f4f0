//! Terminal rendering of the two computations.
//!
//! Amounts are rounded half-up to two decimals here and nowhere else.

use ledger_core::calculations::common::round_half_up;
use ledger_core::calculations::{ManagementBalance, RowValue, StatementRow, TaxEstimate};
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

/// How results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Two decimals, half-up: `1170.5` → `"1170.50"`.
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", round_half_up(amount))
}

/// A fraction shown as a percentage: `0.15` → `"15.00%"`.
pub fn format_rate(rate: Decimal) -> String {
    format!("{}%", format_amount(rate * Decimal::ONE_HUNDRED))
}

fn format_row_value(value: &RowValue) -> String {
    match value {
        RowValue::Integer(n) => n.to_string(),
        RowValue::Text(s) => s.clone(),
        RowValue::Amount(a) => format_amount(*a),
        RowValue::Rate(r) => format_rate(*r),
    }
}

#[derive(Tabled)]
struct LabelRow {
    #[tabled(rename = "Item")]
    label: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

#[derive(Tabled)]
struct SheetRow {
    #[tabled(rename = "Section")]
    section: String,
    #[tabled(rename = "Item")]
    label: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

fn label_table(rows: &[StatementRow]) -> String {
    let rows: Vec<LabelRow> = rows
        .iter()
        .map(|r| LabelRow {
            label: r.label.to_string(),
            amount: format_amount(r.amount),
        })
        .collect();

    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string()
}

/// Balance sheet, income statement and indicators as three tables.
pub fn balance_table(balance: &ManagementBalance) -> String {
    let sheet_rows: Vec<SheetRow> = balance
        .balance_sheet
        .rows()
        .into_iter()
        .map(|r| SheetRow {
            section: r.section.label().to_string(),
            label: r.label.to_string(),
            amount: format_amount(r.amount),
        })
        .collect();

    let sheet = Table::new(sheet_rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..)).with(Alignment::right()))
        .to_string();

    format!(
        "Balance sheet\n{}\n\nIncome statement\n{}\n\nIndicators\n{}",
        sheet,
        label_table(&balance.income_statement.rows()),
        label_table(&balance.indicators.rows()),
    )
}

pub fn tax_table(estimate: &TaxEstimate) -> String {
    let rows: Vec<LabelRow> = estimate
        .rows()
        .iter()
        .map(|(label, value)| LabelRow {
            label: label.to_string(),
            amount: format_row_value(value),
        })
        .collect();

    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string()
}

#[derive(Serialize)]
struct JsonRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    section: Option<&'static str>,
    label: &'static str,
    value: String,
}

fn json_rows(rows: &[StatementRow]) -> Vec<JsonRow> {
    rows.iter()
        .map(|r| JsonRow {
            section: None,
            label: r.label,
            value: format_amount(r.amount),
        })
        .collect()
}

pub fn balance_json(balance: &ManagementBalance) -> Result<String, serde_json::Error> {
    #[derive(Serialize)]
    struct JsonBalance {
        balance_sheet: Vec<JsonRow>,
        income_statement: Vec<JsonRow>,
        indicators: Vec<JsonRow>,
    }

    let report = JsonBalance {
        balance_sheet: balance
            .balance_sheet
            .rows()
            .into_iter()
            .map(|r| JsonRow {
                section: Some(r.section.label()),
                label: r.label,
                value: format_amount(r.amount),
            })
            .collect(),
        income_statement: json_rows(&balance.income_statement.rows()),
        indicators: json_rows(&balance.indicators.rows()),
    };

    serde_json::to_string_pretty(&report)
}

pub fn tax_json(estimate: &TaxEstimate) -> Result<String, serde_json::Error> {
    let rows: Vec<JsonRow> = estimate
        .rows()
        .iter()
        .map(|(label, value)| JsonRow {
            section: None,
            label: *label,
            value: format_row_value(value),
        })
        .collect();

    serde_json::to_string_pretty(&rows)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use ledger_core::calculations::{BalanceBuilder, BalanceInput, TaxEstimator};
    use ledger_core::{Invoice, LedgerSnapshot, TaxConfig};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn snapshot() -> LedgerSnapshot {
        LedgerSnapshot {
            invoices: vec![Invoice {
                id: 1,
                number: "2025/001".to_string(),
                issue_date: NaiveDate::from_ymd_opt(2025, 2, 1),
                collection_date: None,
                amount: dec!(10000),
            }],
            ..Default::default()
        }
    }

    fn balance() -> ManagementBalance {
        BalanceBuilder::new(&snapshot()).build(&BalanceInput {
            year: 2025,
            ref_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            cash_balance: dec!(-250.555),
        })
    }

    #[test]
    fn amounts_round_half_up_to_two_places() {
        assert_eq!(format_amount(dec!(1170.5)), "1170.50");
        assert_eq!(format_amount(dec!(0.005)), "0.01");
        assert_eq!(format_amount(dec!(-250.555)), "-250.56");
        assert_eq!(format_amount(dec!(0)), "0.00");
    }

    #[test]
    fn rates_render_as_percentages() {
        assert_eq!(format_rate(dec!(0.15)), "15.00%");
        assert_eq!(format_rate(dec!(0.2607)), "26.07%");
    }

    #[test]
    fn balance_table_lists_every_row() {
        let output = balance_table(&balance());

        for label in [
            "Cash",
            "Accounts receivable",
            "Tax and contribution liabilities",
            "Operating costs",
            "Gross margin %",
            "Net financial position",
        ] {
            assert!(output.contains(label), "missing {label}:\n{output}");
        }
        assert!(output.contains("-250.56"));
        assert!(output.contains("10000.00"));
    }

    #[test]
    fn tax_table_shows_rates_and_regime() {
        let config = TaxConfig::default_for_year(2025);
        let estimate = TaxEstimator::new(&config).estimate(&snapshot(), 2025);

        let output = tax_table(&estimate);

        assert!(output.contains("flat-rate"), "{output}");
        assert!(output.contains("15.00%"), "{output}");
        assert!(output.contains("1170.00"), "{output}");
        assert!(output.contains("2028.00"), "{output}");
    }

    #[test]
    fn balance_json_keeps_row_order_and_sections() {
        let json: serde_json::Value =
            serde_json::from_str(&balance_json(&balance()).unwrap()).unwrap();

        let sheet = json["balance_sheet"].as_array().unwrap();
        assert_eq!(sheet.len(), 5);
        assert_eq!(sheet[0]["section"], "Assets");
        assert_eq!(sheet[0]["value"], "-250.56");
        assert_eq!(json["indicators"].as_array().unwrap().len(), 9);
        assert_eq!(json["income_statement"][0]["label"], "Revenue");
        assert!(json["income_statement"][0].get("section").is_none());
    }

    #[test]
    fn tax_json_is_a_labelled_list() {
        let config = TaxConfig::default_for_year(2025);
        let estimate = TaxEstimator::new(&config).estimate(&snapshot(), 2025);

        let json: serde_json::Value = serde_json::from_str(&tax_json(&estimate).unwrap()).unwrap();

        assert_eq!(json[0]["label"], "Year");
        assert_eq!(json[0]["value"], "2025");
        assert_eq!(json[6]["label"], "Tax due");
        assert_eq!(json[6]["value"], "1170.00");
    }
}
