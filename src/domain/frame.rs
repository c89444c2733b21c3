//! Indicator frame: price bars joined with their derived columns.
//!
//! Every column is causal (row i only looks at rows 0..=i), so a prefix of a
//! frame is identical to the frame computed from the truncated price history.

use chrono::NaiveDate;

use crate::domain::indicator::{
    self, BollingerBands, IndicatorType, Macd, calculate_atr, calculate_bollinger, calculate_macd,
    calculate_rsi, calculate_sma,
};
use crate::domain::ohlcv::PriceBar;

pub const RSI_PERIOD: usize = 14;
pub const ATR_PERIOD: usize = 14;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_MULT_X100: u32 = 200;

/// Columns carried by every frame, in output order.
pub const COLUMNS: [IndicatorType; 8] = [
    IndicatorType::Sma(20),
    IndicatorType::Sma(50),
    IndicatorType::Sma(200),
    IndicatorType::Rsi(RSI_PERIOD),
    IndicatorType::Atr(ATR_PERIOD),
    IndicatorType::AtrPct(ATR_PERIOD),
    IndicatorType::Bollinger {
        period: BOLLINGER_PERIOD,
        stddev_mult_x100: BOLLINGER_MULT_X100,
    },
    IndicatorType::Macd {
        fast: indicator::macd::DEFAULT_FAST,
        slow: indicator::macd::DEFAULT_SLOW,
        signal: indicator::macd::DEFAULT_SIGNAL,
    },
];

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub bar: PriceBar,
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
    pub ma200: Option<f64>,
    pub rsi14: Option<f64>,
    pub atr14: Option<f64>,
    pub atr_pct: Option<f64>,
    pub bollinger: Option<BollingerBands>,
    pub macd: Option<Macd>,
}

impl IndicatorRow {
    pub fn date(&self) -> NaiveDate {
        self.bar.date
    }

    pub fn close(&self) -> f64 {
        self.bar.close
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorFrame {
    rows: Vec<IndicatorRow>,
}

impl IndicatorFrame {
    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&IndicatorRow> {
        self.rows.last()
    }

    /// The first `len` rows, i.e. the frame as it looked at bar `len - 1`.
    pub fn prefix(&self, len: usize) -> &[IndicatorRow] {
        &self.rows[..len.min(self.rows.len())]
    }

    pub fn bars(&self) -> impl Iterator<Item = &PriceBar> {
        self.rows.iter().map(|r| &r.bar)
    }
}

/// Derive the indicator columns for an ordered price history.
pub fn compute_indicators(prices: &[PriceBar]) -> IndicatorFrame {
    let closes: Vec<f64> = prices.iter().map(|b| b.close).collect();

    let ma20 = calculate_sma(&closes, 20);
    let ma50 = calculate_sma(&closes, 50);
    let ma200 = calculate_sma(&closes, 200);
    let rsi = calculate_rsi(&closes, RSI_PERIOD);
    let atr = calculate_atr(prices, ATR_PERIOD);
    let bollinger = calculate_bollinger(&closes, BOLLINGER_PERIOD, BOLLINGER_MULT_X100);
    let macd = calculate_macd(
        &closes,
        indicator::macd::DEFAULT_FAST,
        indicator::macd::DEFAULT_SLOW,
        indicator::macd::DEFAULT_SIGNAL,
    );

    let rows = prices
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let atr_pct = match atr[i] {
                Some(a) if bar.close != 0.0 => Some(a / bar.close * 100.0),
                _ => None,
            };
            IndicatorRow {
                bar: bar.clone(),
                ma20: ma20[i],
                ma50: ma50[i],
                ma200: ma200[i],
                rsi14: rsi[i],
                atr14: atr[i],
                atr_pct,
                bollinger: bollinger[i],
                macd: macd[i],
            }
        })
        .collect();

    IndicatorFrame { rows }
}
