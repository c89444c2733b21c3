//! Return on capital employed from statement tables.
//!
//! ROCE = EBIT / (Total Assets - Current Liabilities) * 100, evaluated over
//! the four most recent reporting periods.

use serde::Serialize;
use std::fmt;

use crate::domain::fundamentals::FinancialStatementSeries;

pub const EBIT_ALIASES: [&str; 4] = [
    "EBIT",
    "Ebit",
    "Operating Income",
    "Net Income Continuous Operations",
];
pub const TOTAL_ASSETS_ALIASES: [&str; 2] = ["Total Assets", "Assets"];
pub const CURRENT_LIABILITIES_ALIASES: [&str; 3] = [
    "Total Current Liabilities",
    "Current Liabilities",
    "Total Liabilities Net Minority Interest",
];

const MAX_PERIODS: usize = 4;
const AVERAGE_PERIODS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CapitalEfficiency {
    /// Most recent valid period, in percent.
    pub current: f64,
    /// Mean of up to three most recent valid periods, in percent.
    pub avg3y: f64,
}

impl fmt::Display for CapitalEfficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "current {:.2}%, 3y avg {:.2}%", self.current, self.avg3y)
    }
}

/// `None` when no period has the three rows and positive capital employed.
pub fn capital_efficiency(statements: &FinancialStatementSeries) -> Option<CapitalEfficiency> {
    let ebit = statements.resolve(&EBIT_ALIASES)?;
    let assets = statements.resolve(&TOTAL_ASSETS_ALIASES)?;
    let liabilities = statements.resolve(&CURRENT_LIABILITIES_ALIASES)?;

    let mut order: Vec<usize> = (0..statements.periods.len()).collect();
    order.sort_by(|&a, &b| statements.periods[b].cmp(&statements.periods[a]));

    let roces: Vec<f64> = order
        .into_iter()
        .take(MAX_PERIODS)
        .filter_map(|j| {
            let (e, a, l) = (ebit[j]?, assets[j]?, liabilities[j]?);
            let capital_employed = a - l;
            if capital_employed <= 0.0 {
                return None;
            }
            Some(e / capital_employed * 100.0)
        })
        .collect();

    let current = *roces.first()?;
    let recent = &roces[..roces.len().min(AVERAGE_PERIODS)];
    let avg3y = recent.iter().sum::<f64>() / recent.len() as f64;

    Some(CapitalEfficiency { current, avg3y })
}
