//! Pairwise return correlation and a portfolio diversity score.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::ohlcv::PriceBar;

pub const WINDOW_DAYS: i64 = 365;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationResult {
    pub tickers: Vec<String>,
    /// Symmetric, diagonal 1. NaN where a series has no variance.
    pub matrix: Vec<Vec<f64>>,
    pub diversity_score: f64,
    /// Common return observations the matrix was computed from.
    pub observations: usize,
}

impl CorrelationResult {
    pub fn correlation(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.tickers.iter().position(|t| t == a)?;
        let j = self.tickers.iter().position(|t| t == b)?;
        Some(self.matrix[i][j])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DiversityReport {
    InsufficientInstruments { got: usize },
    /// Fewer than two shared returns, or no pair with a defined correlation.
    InsufficientOverlap { observations: usize },
    Analyzed(CorrelationResult),
}

pub fn diversity(series: &[(String, Vec<PriceBar>)]) -> DiversityReport {
    if series.len() < 2 {
        return DiversityReport::InsufficientInstruments { got: series.len() };
    }

    let returns = aligned_returns(series);
    let observations = returns.first().map_or(0, Vec::len);
    if observations < 2 {
        return DiversityReport::InsufficientOverlap { observations };
    }
    let n = series.len();
    let mut matrix = vec![vec![1.0; n]; n];
    let mut lower = Vec::with_capacity(n * (n - 1) / 2);

    for i in 0..n {
        for j in 0..i {
            let rho = pearson(&returns[i], &returns[j]).unwrap_or(f64::NAN);
            matrix[i][j] = rho;
            matrix[j][i] = rho;
            if rho.is_finite() {
                lower.push(rho);
            }
        }
    }

    if lower.is_empty() {
        return DiversityReport::InsufficientOverlap { observations };
    }
    let mean = lower.iter().sum::<f64>() / lower.len() as f64;

    DiversityReport::Analyzed(CorrelationResult {
        tickers: series.iter().map(|(t, _)| t.clone()).collect(),
        matrix,
        diversity_score: (100.0 - 100.0 * mean).clamp(0.0, 100.0),
        observations,
    })
}

/// Daily percentage returns over the trailing window, on dates every
/// series shares. One vector per input series, all the same length.
fn aligned_returns(series: &[(String, Vec<PriceBar>)]) -> Vec<Vec<f64>> {
    let Some(latest) = series
        .iter()
        .filter_map(|(_, bars)| bars.last().map(|b| b.date))
        .max()
    else {
        return vec![Vec::new(); series.len()];
    };
    let window_start: NaiveDate = latest - Duration::days(WINDOW_DAYS);

    let mut by_date: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();
    for (k, (_, bars)) in series.iter().enumerate() {
        for bar in bars.iter().filter(|b| b.date >= window_start) {
            by_date.entry(bar.date).or_insert_with(|| vec![None; series.len()])[k] = Some(bar.close);
        }
    }

    let common: Vec<Vec<f64>> = by_date
        .into_values()
        .filter_map(|row| row.into_iter().collect::<Option<Vec<f64>>>())
        .collect();

    let mut returns = vec![Vec::with_capacity(common.len()); series.len()];
    for pair in common.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        if prev.iter().any(|&p| p == 0.0) {
            continue;
        }
        for (k, out) in returns.iter_mut().enumerate() {
            out.push((curr[k] - prev[k]) / prev[k]);
        }
    }
    returns
}

/// Pearson correlation; `None` for fewer than two points or a flat series.
fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }
    let mean_x = x[..n].iter().sum::<f64>() / n as f64;
    let mean_y = y[..n].iter().sum::<f64>() / n as f64;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in x[..n].iter().zip(&y[..n]) {
        let (dx, dy) = (a - mean_x, b - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x <= 0.0 || var_y <= 0.0 {
        return None;
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}
