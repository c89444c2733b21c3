//! Sparse fundamental snapshot and financial statement tables.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

pub const TRAILING_PE: &str = "trailingPE";
pub const FORWARD_PE: &str = "forwardPE";
pub const PEG_RATIO: &str = "pegRatio";
pub const TRAILING_PEG_RATIO: &str = "trailingPegRatio";
pub const RETURN_ON_EQUITY: &str = "returnOnEquity";
pub const RETURN_ON_ASSETS: &str = "returnOnAssets";
pub const PROFIT_MARGINS: &str = "profitMargins";
pub const DEBT_TO_EQUITY: &str = "debtToEquity";
pub const BETA: &str = "beta";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FundamentalValue {
    Number(f64),
    Text(String),
}

/// Vendor key/value snapshot. Any field may be missing or non-numeric.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FundamentalSnapshot {
    fields: BTreeMap<String, FundamentalValue>,
}

impl FundamentalSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ratio(mut self, key: &str, value: f64) -> Self {
        self.insert(key, FundamentalValue::Number(value));
        self
    }

    pub fn insert(&mut self, key: &str, value: FundamentalValue) {
        self.fields.insert(key.to_string(), value);
    }

    /// Store a raw vendor string, keeping it numeric when it parses.
    pub fn insert_raw(&mut self, key: &str, raw: &str) {
        let trimmed = raw.trim();
        let value = match trimmed.parse::<f64>() {
            Ok(v) => FundamentalValue::Number(v),
            Err(_) => FundamentalValue::Text(trimmed.to_string()),
        };
        self.insert(key, value);
    }

    /// Numeric, finite value for `key`; anything else reads as absent.
    pub fn ratio(&self, key: &str) -> Option<f64> {
        match self.fields.get(key) {
            Some(FundamentalValue::Number(v)) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(FundamentalValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// PEG under either vendor spelling.
    pub fn peg(&self) -> Option<f64> {
        self.ratio(PEG_RATIO).or_else(|| self.ratio(TRAILING_PEG_RATIO))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Statement line items by name across reporting periods.
///
/// `periods[j]` is the period end date of column j; each row holds one cell
/// per period, `None` where the vendor left it blank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinancialStatementSeries {
    pub periods: Vec<NaiveDate>,
    rows: Vec<(String, Vec<Option<f64>>)>,
}

impl FinancialStatementSeries {
    pub fn new(periods: Vec<NaiveDate>) -> Self {
        Self {
            periods,
            rows: Vec::new(),
        }
    }

    pub fn with_row(mut self, name: &str, cells: Vec<Option<f64>>) -> Self {
        self.push_row(name, cells);
        self
    }

    pub fn push_row(&mut self, name: &str, mut cells: Vec<Option<f64>>) {
        cells.resize(self.periods.len(), None);
        self.rows.push((name.to_string(), cells));
    }

    /// First row matching any alias, in alias priority order.
    /// Matching ignores case and surrounding whitespace.
    pub fn resolve(&self, aliases: &[&str]) -> Option<&[Option<f64>]> {
        aliases.iter().find_map(|alias| {
            let wanted = normalize(alias);
            self.rows
                .iter()
                .find(|(name, _)| normalize(name) == wanted)
                .map(|(_, cells)| cells.as_slice())
        })
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty() || self.rows.is_empty()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_reads_numbers() {
        let snap = FundamentalSnapshot::new().with_ratio(TRAILING_PE, 14.2);
        assert_eq!(snap.ratio(TRAILING_PE), Some(14.2));
        assert_eq!(snap.ratio(FORWARD_PE), None);
    }

    #[test]
    fn non_numeric_reads_as_absent() {
        let mut snap = FundamentalSnapshot::new();
        snap.insert_raw(BETA, "Infinity?");
        snap.insert_raw(TRAILING_PE, " 21.5 ");
        assert_eq!(snap.ratio(BETA), None);
        assert_eq!(snap.text(BETA), Some("Infinity?"));
        assert_eq!(snap.ratio(TRAILING_PE), Some(21.5));
    }

    #[test]
    fn non_finite_reads_as_absent() {
        let snap = FundamentalSnapshot::new().with_ratio(PEG_RATIO, f64::NAN);
        assert_eq!(snap.peg(), None);
    }

    #[test]
    fn peg_falls_back_to_trailing_key() {
        let snap = FundamentalSnapshot::new().with_ratio(TRAILING_PEG_RATIO, 0.8);
        assert_eq!(snap.peg(), Some(0.8));
    }

    #[test]
    fn resolve_is_case_and_whitespace_insensitive() {
        let periods = vec![NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()];
        let series = FinancialStatementSeries::new(periods).with_row("  Total Assets ", vec![Some(10.0)]);
        assert_eq!(series.resolve(&["total assets"]), Some(&[Some(10.0)][..]));
    }

    #[test]
    fn resolve_honours_alias_priority() {
        let periods = vec![NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()];
        let series = FinancialStatementSeries::new(periods)
            .with_row("Operating Income", vec![Some(5.0)])
            .with_row("EBIT", vec![Some(7.0)]);
        let row = series.resolve(&["EBIT", "Operating Income"]).unwrap();
        assert_eq!(row[0], Some(7.0));
    }

    #[test]
    fn short_rows_are_padded() {
        let periods = vec![
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
        ];
        let series = FinancialStatementSeries::new(periods).with_row("EBIT", vec![Some(1.0)]);
        assert_eq!(series.resolve(&["EBIT"]).unwrap(), &[Some(1.0), None]);
    }
}
