//! RSI (Relative Strength Index) with Wilder smoothing.
//!
//! Gains and losses are smoothed with an exponential average, alpha = 1/n,
//! seeded at the first bar with a zero change:
//! - avg[0] = 0
//! - avg[i] = avg[i-1] * (1 - 1/n) + x[i] / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: the first n bars are `None` (n price changes are needed).

use super::Series;

pub fn calculate_rsi(closes: &[f64], period: usize) -> Series {
    if period == 0 || closes.len() < 2 {
        return vec![None; closes.len()];
    }

    let alpha = 1.0 / period as f64;
    let mut values = Vec::with_capacity(closes.len());
    values.push(None);

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for i in 1..closes.len() {
        let change = closes[i] - closes[i - 1];
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };

        avg_gain = avg_gain * (1.0 - alpha) + gain * alpha;
        avg_loss = avg_loss * (1.0 - alpha) + loss * alpha;

        if i < period {
            values.push(None);
            continue;
        }

        let rsi = if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
        };
        values.push(Some(rsi));
    }

    values
}
