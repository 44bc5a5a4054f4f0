use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Taxation regime of a fiscal year.
///
/// Unrecognised labels are kept verbatim in [`TaxRegime::Other`] and are
/// computed like [`TaxRegime::Standard`] (revenue minus costs).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaxRegime {
    /// Regime forfettario: a statutory coefficient of revenue is taxed,
    /// actual costs are ignored.
    FlatRate,
    /// Regime ordinario: revenue minus costs is taxed.
    Standard,
    Other(String),
}

impl TaxRegime {
    pub fn as_str(&self) -> &str {
        match self {
            Self::FlatRate => "flat-rate",
            Self::Standard => "standard",
            Self::Other(label) => label,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat-rate" | "flat_rate" | "forfettario" => Self::FlatRate,
            "standard" | "ordinario" => Self::Standard,
            _ => Self::Other(s.to_string()),
        }
    }

    pub fn is_flat_rate(&self) -> bool {
        matches!(self, Self::FlatRate)
    }
}

impl fmt::Display for TaxRegime {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for TaxRegime {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<TaxRegime> for String {
    fn from(regime: TaxRegime) -> Self {
        regime.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxConfig {
    pub fiscal_year: i32,
    pub regime: TaxRegime,
    pub tax_rate: Decimal,
    pub contribution_rate: Decimal,
    /// Share of revenue treated as taxable under the flat-rate regime.
    pub profitability_coefficient: Option<Decimal>,
}

impl TaxConfig {
    /// Configuration used when a fiscal year has never been configured:
    /// flat-rate regime, 15% substitute tax, 26% INPS Gestione Separata,
    /// 78% profitability coefficient.
    pub fn default_for_year(fiscal_year: i32) -> Self {
        Self {
            fiscal_year,
            regime: TaxRegime::FlatRate,
            tax_rate: Decimal::new(15, 2),
            contribution_rate: Decimal::new(26, 2),
            profitability_coefficient: Some(Decimal::new(78, 2)),
        }
    }

    /// Coefficient applied to flat-rate revenue; 1 when unset.
    pub fn coefficient_or_one(&self) -> Decimal {
        self.profitability_coefficient.unwrap_or(Decimal::ONE)
    }
}
