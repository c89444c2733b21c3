#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tickerscope::domain::error::TickerscopeError;
pub use tickerscope::domain::ohlcv::PriceBar;
use tickerscope::ports::data_port::PriceHistoryPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
    pub panics: HashSet<String>,
    pub calls: AtomicUsize,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            panics: HashSet::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }

    pub fn with_panic(mut self, ticker: &str) -> Self {
        self.panics.insert(ticker.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PriceHistoryPort for MockDataPort {
    fn fetch_prices(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, TickerscopeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.panics.contains(ticker) {
            panic!("vendor blew up for {ticker}");
        }
        if let Some(reason) = self.errors.get(ticker) {
            return Err(TickerscopeError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(ticker)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start && b.date <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(day: NaiveDate, close: f64) -> PriceBar {
    PriceBar {
        date: day,
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1_000.0,
    }
}

/// `n` consecutive daily bars from `start`, drifting by `step` per bar with a
/// small alternating wiggle so RSI and ATR stay defined.
pub fn trending_bars(start: NaiveDate, n: usize, base: f64, step: f64) -> Vec<PriceBar> {
    (0..n)
        .map(|i| {
            let wiggle = if i % 2 == 0 { 0.4 } else { -0.4 };
            let close = (base + step * i as f64 + wiggle).max(0.5);
            PriceBar {
                date: start + Duration::days(i as i64),
                open: close - step * 0.5,
                high: close + 1.0,
                low: (close - 1.0).max(0.1),
                close,
                volume: 10_000.0 + i as f64,
            }
        })
        .collect()
}

/// Bars whose closes follow `closes`, one per day from `start`.
pub fn bars_from_closes(start: NaiveDate, closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(start + Duration::days(i as i64), c))
        .collect()
}

pub fn write_price_csv(dir: &std::path::Path, ticker: &str, bars: &[PriceBar]) {
    let mut content = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date.format("%Y-%m-%d"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        ));
    }
    std::fs::write(dir.join(format!("{ticker}.csv")), content).unwrap();
}
