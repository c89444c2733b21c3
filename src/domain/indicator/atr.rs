//! Average True Range with Wilder smoothing.
//!
//! TR[0] = high - low, TR[i] = max(H-L, |H-C[i-1]|, |L-C[i-1]|).
//! ATR is the alpha = 1/n exponential average of TR seeded with TR[0].
//! Warmup: first (n-1) bars are `None`.

use super::Series;
use crate::domain::ohlcv::PriceBar;

pub fn calculate_atr(bars: &[PriceBar], period: usize) -> Series {
    if period == 0 || bars.is_empty() {
        return vec![None; bars.len()];
    }

    let alpha = 1.0 / period as f64;
    let mut values = Vec::with_capacity(bars.len());
    let mut atr = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        let tr = if i == 0 {
            bar.high - bar.low
        } else {
            bar.true_range(bars[i - 1].close)
        };

        atr = if i == 0 {
            tr
        } else {
            atr * (1.0 - alpha) + tr * alpha
        };

        if i + 1 < period {
            values.push(None);
        } else {
            values.push(Some(atr));
        }
    }

    values
}
