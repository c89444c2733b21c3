//! Exponential Moving Average.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) defined inputs produce `None`.

use super::Series;

pub fn calculate_ema(closes: &[f64], period: usize) -> Series {
    let values: Series = closes.iter().copied().map(Some).collect();
    ema_of(&values, period)
}

/// EMA over a series that may itself start with a warmup run of `None`.
///
/// Leading `None`s are skipped; the seed is the mean of the first `period`
/// defined values. A `None` after the seed carries the previous EMA forward
/// without emitting a value.
pub fn ema_of(values: &[Option<f64>], period: usize) -> Series {
    if period == 0 {
        return vec![None; values.len()];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut seen = 0usize;
    let mut sum = 0.0;
    let mut ema: Option<f64> = None;

    for value in values {
        let Some(v) = *value else {
            out.push(None);
            continue;
        };

        match ema {
            Some(prev) => {
                let next = v * k + prev * (1.0 - k);
                ema = Some(next);
                out.push(Some(next));
            }
            None => {
                seen += 1;
                sum += v;
                if seen == period {
                    let seed = sum / period as f64;
                    ema = Some(seed);
                    out.push(Some(seed));
                } else {
                    out.push(None);
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_warmup() {
        let series = calculate_ema(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);

        assert!(series[0].is_none());
        assert!(series[1].is_none());
        assert!(series[2].is_some());
        assert!(series[3].is_some());
        assert!(series[4].is_some());
    }

    #[test]
    fn ema_period_1() {
        let series = calculate_ema(&[10.0, 20.0, 30.0], 1);

        assert!((series[0].unwrap() - 10.0).abs() < f64::EPSILON);
        assert!((series[1].unwrap() - 20.0).abs() < f64::EPSILON);
        assert!((series[2].unwrap() - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_seed_is_sma() {
        let series = calculate_ema(&[10.0, 20.0, 30.0], 3);
        let expected_sma = (10.0 + 20.0 + 30.0) / 3.0;
        assert!((series[2].unwrap() - expected_sma).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_recursive_calculation() {
        let series = calculate_ema(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);

        let k = 2.0 / 4.0;
        let sma = (10.0 + 20.0 + 30.0) / 3.0;
        let ema_3 = 40.0 * k + sma * (1.0 - k);
        let ema_4 = 50.0 * k + ema_3 * (1.0 - k);

        assert!((series[3].unwrap() - ema_3).abs() < f64::EPSILON);
        assert!((series[4].unwrap() - ema_4).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_of_skips_leading_none() {
        let input = vec![None, None, Some(1.0), Some(2.0), Some(3.0)];
        let series = ema_of(&input, 2);

        assert!(series[0].is_none());
        assert!(series[1].is_none());
        assert!(series[2].is_none());
        assert!((series[3].unwrap() - 1.5).abs() < f64::EPSILON);
        let k = 2.0 / 3.0;
        assert!((series[4].unwrap() - (3.0 * k + 1.5 * (1.0 - k))).abs() < 1e-12);
    }

    #[test]
    fn ema_equal_prices() {
        let series = calculate_ema(&[100.0; 5], 3);
        for v in series.iter().skip(2) {
            assert!((v.unwrap() - 100.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn ema_empty_and_zero_period() {
        assert!(calculate_ema(&[], 3).is_empty());
        assert_eq!(calculate_ema(&[10.0, 20.0], 0), vec![None, None]);
    }
}
