//! Bollinger Bands indicator.
//!
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! StdDev is the population standard deviation (divides by N, not N-1).
//! Warmup: first (period-1) bars are `None`.

use super::sma::calculate_sma;
use super::stddev::calculate_stddev;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

pub fn calculate_bollinger(
    closes: &[f64],
    period: usize,
    stddev_mult_x100: u32,
) -> Vec<Option<BollingerBands>> {
    let mult = stddev_mult_x100 as f64 / 100.0;
    let middle = calculate_sma(closes, period);
    let stddev = calculate_stddev(closes, period);

    middle
        .into_iter()
        .zip(stddev)
        .map(|(m, s)| match (m, s) {
            (Some(middle), Some(sd)) => Some(BollingerBands {
                upper: middle + mult * sd,
                middle,
                lower: middle - mult * sd,
            }),
            _ => None,
        })
        .collect()
}
