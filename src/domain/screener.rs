//! Batch scoring over a ticker universe.
//!
//! Tickers are fetched, scored and summarised independently on a bounded
//! rayon pool. A data error or a panic while handling one ticker becomes
//! that ticker's `Failed` outcome; the rest of the batch carries on.

use chrono::{Duration, NaiveDate};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{debug, info, warn};

use crate::domain::decision::{DecisionResult, ScoreInputs, score};
use crate::domain::frame::compute_indicators;
use crate::domain::profile::Profile;
use crate::domain::regime::MarketRegime;
use crate::ports::data_port::PriceHistoryPort;

pub const MIN_SCREEN_BARS: usize = 60;
/// Extra calendar days fetched beyond the lookback so MA200 can form.
pub const HISTORY_PADDING_DAYS: i64 = 260;
pub const DEFAULT_LOOKBACK_DAYS: i64 = 120;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in ticker list")]
    EmptyToken,

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),
}

/// Comma-separated tickers, trimmed and upper-cased.
pub fn parse_tickers(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let ticker = trimmed.to_uppercase();
        if !seen.insert(ticker.clone()) {
            return Err(UniverseError::DuplicateTicker(ticker));
        }
        tickers.push(ticker);
    }

    Ok(tickers)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRequest {
    pub end: NaiveDate,
    pub lookback_days: i64,
    pub min_bars: usize,
    pub profile: Profile,
    pub regime: Option<MarketRegime>,
}

impl ScreenRequest {
    pub fn new(end: NaiveDate, profile: Profile) -> Self {
        Self {
            end,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            min_bars: MIN_SCREEN_BARS,
            profile,
            regime: None,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.end - Duration::days(self.lookback_days + HISTORY_PADDING_DAYS)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenRow {
    pub ticker: String,
    pub decision: DecisionResult,
    pub last_close: f64,
    /// Change from the previous close; `None` for a single-bar history.
    pub change: Option<f64>,
    pub change_pct: Option<f64>,
    pub volume: f64,
    /// Distance of the close from MA20, in percent of MA20.
    pub dist_ma20_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    NoData,
    InsufficientBars { bars: usize, minimum: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScreenOutcome {
    Scored(ScreenRow),
    Skipped { ticker: String, reason: SkipReason },
    Failed { ticker: String, reason: String },
}

impl ScreenOutcome {
    pub fn ticker(&self) -> &str {
        match self {
            ScreenOutcome::Scored(row) => &row.ticker,
            ScreenOutcome::Skipped { ticker, .. } | ScreenOutcome::Failed { ticker, .. } => ticker,
        }
    }
}

/// Screen `tickers` with at most `concurrency` worker threads.
/// Outcomes come back in input order.
pub fn screen_universe(
    port: &dyn PriceHistoryPort,
    tickers: &[String],
    request: &ScreenRequest,
    concurrency: usize,
) -> Vec<ScreenOutcome> {
    let run = || -> Vec<ScreenOutcome> {
        tickers
            .par_iter()
            .map(|ticker| screen_isolated(port, ticker, request))
            .collect()
    };

    let outcomes = match rayon::ThreadPoolBuilder::new()
        .num_threads(concurrency.max(1))
        .build()
    {
        Ok(pool) => pool.install(run),
        Err(e) => {
            warn!(error = %e, "could not build screening pool, using global pool");
            run()
        }
    };

    let scored = outcomes
        .iter()
        .filter(|o| matches!(o, ScreenOutcome::Scored(_)))
        .count();
    let failed = outcomes
        .iter()
        .filter(|o| matches!(o, ScreenOutcome::Failed { .. }))
        .count();
    info!(
        total = outcomes.len(),
        scored,
        skipped = outcomes.len() - scored - failed,
        failed,
        "screen complete"
    );
    outcomes
}

fn screen_isolated(port: &dyn PriceHistoryPort, ticker: &str, request: &ScreenRequest) -> ScreenOutcome {
    match catch_unwind(AssertUnwindSafe(|| screen_one(port, ticker, request))) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic while screening".to_string());
            warn!(ticker, %reason, "ticker panicked");
            ScreenOutcome::Failed {
                ticker: ticker.to_string(),
                reason,
            }
        }
    }
}

fn screen_one(port: &dyn PriceHistoryPort, ticker: &str, request: &ScreenRequest) -> ScreenOutcome {
    let bars = match port.fetch_prices(ticker, request.start(), request.end) {
        Ok(bars) => bars,
        Err(e) => {
            warn!(ticker, error = %e, "fetch failed");
            return ScreenOutcome::Failed {
                ticker: ticker.to_string(),
                reason: e.to_string(),
            };
        }
    };

    if bars.is_empty() {
        debug!(ticker, "skipping, no data");
        return ScreenOutcome::Skipped {
            ticker: ticker.to_string(),
            reason: SkipReason::NoData,
        };
    }
    if bars.len() < request.min_bars {
        debug!(ticker, bars = bars.len(), minimum = request.min_bars, "skipping, short history");
        return ScreenOutcome::Skipped {
            ticker: ticker.to_string(),
            reason: SkipReason::InsufficientBars {
                bars: bars.len(),
                minimum: request.min_bars,
            },
        };
    }

    let frame = compute_indicators(&bars);
    let rows = frame.rows();
    let inputs = ScoreInputs {
        regime: request.regime,
        ..ScoreInputs::default()
    };
    let decision = score(rows, request.profile, &inputs);

    let mut recent = rows.iter().rev();
    let Some(last) = recent.next() else {
        return ScreenOutcome::Skipped {
            ticker: ticker.to_string(),
            reason: SkipReason::NoData,
        };
    };
    let prev_close = recent.next().map(|r| r.close());
    let change = prev_close.map(|p| last.close() - p);
    let change_pct = match (change, prev_close) {
        (Some(c), Some(p)) if p != 0.0 => Some(c / p * 100.0),
        _ => None,
    };
    let dist_ma20_pct = last
        .ma20
        .filter(|&m| m != 0.0)
        .map(|m| (last.close() - m) / m * 100.0);

    ScreenOutcome::Scored(ScreenRow {
        ticker: ticker.to_string(),
        decision,
        last_close: last.close(),
        change,
        change_pct,
        volume: last.bar.volume,
        dist_ma20_pct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tickers_basic() {
        assert_eq!(
            parse_tickers("aapl, msft ,BHP.AX").unwrap(),
            vec!["AAPL", "MSFT", "BHP.AX"]
        );
    }

    #[test]
    fn parse_tickers_empty_token() {
        assert_eq!(parse_tickers("AAPL,,MSFT"), Err(UniverseError::EmptyToken));
        assert_eq!(parse_tickers(""), Err(UniverseError::EmptyToken));
    }

    #[test]
    fn parse_tickers_duplicate() {
        assert_eq!(
            parse_tickers("AAPL,aapl"),
            Err(UniverseError::DuplicateTicker("AAPL".into()))
        );
    }

    #[test]
    fn request_start_includes_padding() {
        let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let req = ScreenRequest::new(end, Profile::Trader);
        assert_eq!((end - req.start()).num_days(), DEFAULT_LOOKBACK_DAYS + HISTORY_PADDING_DAYS);
    }
}
