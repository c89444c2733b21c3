//! Forward price simulation by geometric random walk.
//!
//! Drift and volatility come from the history's daily log returns. Each path
//! draws from its own `StdRng`, seeded from the caller's generator, so the
//! paths can run on the rayon pool and still reproduce under a fixed seed.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_distr::StandardNormal;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::domain::ohlcv::PriceBar;

pub const MIN_HISTORY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonteCarloConfig {
    pub horizon_days: usize,
    pub paths: usize,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            horizon_days: 30,
            paths: 1_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonteCarloResult {
    pub anchor_price: f64,
    pub anchor_date: NaiveDate,
    /// Anchor date plus the horizon in calendar days.
    pub end_date: NaiveDate,
    /// Index 0 is the anchor; index `t` is `t` steps ahead.
    pub p05: Vec<f64>,
    pub p50: Vec<f64>,
    pub p95: Vec<f64>,
    pub drift: f64,
    pub sigma: f64,
    /// Share of paths ending below the anchor price.
    pub probability_of_loss: f64,
}

/// Drift and sigma of daily log returns; `None` on non-positive closes.
pub fn estimate_parameters(prices: &[PriceBar]) -> Option<(f64, f64)> {
    if prices.len() < 2 || prices.iter().any(|b| b.close <= 0.0 || !b.close.is_finite()) {
        return None;
    }
    let log_returns: Vec<f64> = prices
        .windows(2)
        .map(|w| (w[1].close / w[0].close).ln())
        .collect();

    let n = log_returns.len() as f64;
    let mean = log_returns.iter().sum::<f64>() / n;
    let variance = if log_returns.len() > 1 {
        log_returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0)
    } else {
        0.0
    };

    Some((mean - 0.5 * variance, variance.sqrt()))
}

/// Simulate with an entropy-seeded generator.
pub fn simulate_future(prices: &[PriceBar], horizon_days: usize, paths: usize) -> Option<MonteCarloResult> {
    let mut rng = StdRng::from_entropy();
    simulate_future_with_rng(prices, &MonteCarloConfig { horizon_days, paths }, &mut rng)
}

pub fn simulate_future_with_rng<R: RngCore + ?Sized>(
    prices: &[PriceBar],
    config: &MonteCarloConfig,
    rng: &mut R,
) -> Option<MonteCarloResult> {
    if prices.len() < MIN_HISTORY || config.paths == 0 {
        return None;
    }
    let (drift, sigma) = estimate_parameters(prices)?;
    let anchor = prices.last()?;
    let days = config.horizon_days;

    debug!(drift, sigma, days, paths = config.paths, "monte carlo parameters");

    let seeds: Vec<u64> = (0..config.paths).map(|_| rng.next_u64()).collect();
    let simulated: Vec<Vec<f64>> = seeds
        .into_par_iter()
        .map(|seed| {
            let mut path_rng = StdRng::seed_from_u64(seed);
            let mut path = Vec::with_capacity(days + 1);
            let mut price = anchor.close;
            path.push(price);
            for _ in 0..days {
                let z: f64 = path_rng.sample(StandardNormal);
                price *= (drift + sigma * z).exp();
                path.push(price);
            }
            path
        })
        .collect();

    let mut p05 = Vec::with_capacity(days + 1);
    let mut p50 = Vec::with_capacity(days + 1);
    let mut p95 = Vec::with_capacity(days + 1);
    let mut column = vec![0.0; simulated.len()];
    for t in 0..=days {
        for (slot, path) in column.iter_mut().zip(&simulated) {
            *slot = path[t];
        }
        column.sort_by(f64::total_cmp);
        p05.push(percentile(&column, 5.0));
        p50.push(percentile(&column, 50.0));
        p95.push(percentile(&column, 95.0));
    }

    let losers = simulated
        .iter()
        .filter(|p| p.last().is_some_and(|&v| v < anchor.close))
        .count();

    Some(MonteCarloResult {
        anchor_price: anchor.close,
        anchor_date: anchor.date,
        end_date: anchor.date + chrono::Duration::days(days as i64),
        p05,
        p50,
        p95,
        drift,
        sigma,
        probability_of_loss: losers as f64 / simulated.len() as f64,
    })
}

/// Linear-interpolated percentile of an ascending slice.
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = pct / 100.0 * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let frac = rank - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}
