//! Trailing returns and compound annual growth from a price history.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::domain::ohlcv::PriceBar;

const DAYS_PER_YEAR: i64 = 365;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TrailingReturns {
    pub w1: Option<f64>,
    pub m1: Option<f64>,
    pub y1: Option<f64>,
    pub y3: Option<f64>,
    pub y5: Option<f64>,
}

/// Close of the last bar on or before `target`. Bars must be ascending.
fn close_on_or_before(bars: &[PriceBar], target: NaiveDate) -> Option<f64> {
    let idx = bars.partition_point(|b| b.date <= target);
    idx.checked_sub(1).map(|i| bars[i].close)
}

/// Percent change from `days_back` calendar days ago to the last close.
pub fn change_since(bars: &[PriceBar], days_back: i64) -> Option<f64> {
    let last = bars.last()?;
    let past = close_on_or_before(bars, last.date - Duration::days(days_back))?;
    if past == 0.0 {
        return None;
    }
    Some((last.close - past) / past * 100.0)
}

pub fn trailing_returns(bars: &[PriceBar]) -> TrailingReturns {
    TrailingReturns {
        w1: change_since(bars, 7),
        m1: change_since(bars, 30),
        y1: change_since(bars, DAYS_PER_YEAR),
        y3: change_since(bars, 3 * DAYS_PER_YEAR),
        y5: change_since(bars, 5 * DAYS_PER_YEAR),
    }
}

/// Compound annual growth rate in percent over `years`.
pub fn cagr(bars: &[PriceBar], years: u32) -> Option<f64> {
    if years == 0 {
        return None;
    }
    let last = bars.last()?;
    let start = close_on_or_before(bars, last.date - Duration::days(i64::from(years) * DAYS_PER_YEAR))?;
    if start <= 0.0 || last.close <= 0.0 {
        return None;
    }
    Some(((last.close / start).powf(1.0 / f64::from(years)) - 1.0) * 100.0)
}

pub fn trailing_cagr_3y(bars: &[PriceBar]) -> Option<f64> {
    cagr(bars, 3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bar(date: NaiveDate, close: f64) -> PriceBar {
        PriceBar {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn week_change_uses_bar_on_or_before_target() {
        let bars = vec![
            bar(d(2024, 3, 1), 100.0),
            bar(d(2024, 3, 4), 104.0),
            bar(d(2024, 3, 11), 110.0),
        ];
        // target 2024-03-04 lands on a bar
        assert_relative_eq!(change_since(&bars, 7).unwrap(), (110.0 - 104.0) / 104.0 * 100.0);
        // target 2024-03-03 falls back to 2024-03-01
        assert_relative_eq!(change_since(&bars, 8).unwrap(), 10.0);
    }

    #[test]
    fn not_enough_history() {
        let bars = vec![bar(d(2024, 3, 1), 100.0), bar(d(2024, 3, 4), 101.0)];
        let r = trailing_returns(&bars);
        assert!(r.w1.is_none());
        assert!(r.y5.is_none());
        assert_eq!(trailing_returns(&[]), TrailingReturns::default());
    }

    #[test]
    fn zero_past_close_is_undefined() {
        let bars = vec![bar(d(2024, 1, 1), 0.0), bar(d(2024, 2, 1), 5.0)];
        assert!(change_since(&bars, 30).is_none());
    }

    #[test]
    fn cagr_doubling_over_three_years() {
        let bars = vec![bar(d(2021, 1, 1), 50.0), bar(d(2024, 1, 1), 100.0)];
        let expected = (2.0_f64.powf(1.0 / 3.0) - 1.0) * 100.0;
        assert_relative_eq!(trailing_cagr_3y(&bars).unwrap(), expected, epsilon = 1e-9);
    }

    #[test]
    fn cagr_needs_full_horizon() {
        let bars = vec![bar(d(2022, 1, 1), 50.0), bar(d(2024, 1, 1), 100.0)];
        assert!(trailing_cagr_3y(&bars).is_none());
        assert!(cagr(&bars, 0).is_none());
    }
}
