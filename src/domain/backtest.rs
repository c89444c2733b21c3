//! Single-instrument backtest driven by the decision engine.
//!
//! The simulator is a two-state machine. While `Flat`, each bar asks the
//! engine for a verdict on the history up to that bar and goes all-in on
//! BUY. While `InTrade`, each bar checks the recorded stop and target at
//! the close; the stop is checked first. There is no signal-driven exit.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::domain::decision::{ScoreInputs, score};
use crate::domain::frame::IndicatorFrame;
use crate::domain::metrics::{EquityPoint, TradeStats, compute_drawdown, return_pct};
use crate::domain::ohlcv::PriceBar;
use crate::domain::performance::trailing_cagr_3y;
use crate::domain::profile::Profile;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 10_000.0;
pub const DEFAULT_WARMUP_BARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    /// Bars skipped before the first decision.
    pub warmup_bars: usize,
    /// CAGR in percent handed to every decision. `None` measures the
    /// trailing three-year CAGR of the bars replayed so far.
    pub cagr: Option<f64>,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            warmup_bars: DEFAULT_WARMUP_BARS,
            cagr: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => f.write_str("BUY"),
            TradeSide::Sell => f.write_str("SELL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitReason {
    #[serde(rename = "Stop Loss")]
    StopLoss,
    #[serde(rename = "Target Hit")]
    TargetHit,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::StopLoss => f.write_str("Stop Loss"),
            ExitReason::TargetHit => f.write_str("Target Hit"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub date: NaiveDate,
    pub side: TradeSide,
    pub price: f64,
    pub shares: f64,
    pub reason: String,
    /// Realised profit; SELL only.
    pub profit: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenTrade {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub stop: f64,
    pub target: f64,
    pub shares: f64,
    pub capital_before: f64,
}

impl OpenTrade {
    /// Exit triggered by `close`, stop before target.
    pub fn exit_signal(&self, close: f64) -> Option<ExitReason> {
        if close <= self.stop {
            Some(ExitReason::StopLoss)
        } else if close >= self.target {
            Some(ExitReason::TargetHit)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionState {
    Flat,
    InTrade(OpenTrade),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub initial_capital: f64,
    pub final_capital: f64,
    pub return_pct: f64,
    /// BUY and SELL entries in the trade log.
    pub total_trades: usize,
    /// Fraction of SELL trades with positive profit.
    pub win_rate: f64,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub max_drawdown: f64,
    pub stats: TradeStats,
    /// Still holding at the last bar; `final_capital` is marked to market.
    pub open_at_end: bool,
}

impl BacktestResult {
    pub fn empty(initial_capital: f64) -> Self {
        Self {
            initial_capital,
            final_capital: initial_capital,
            return_pct: 0.0,
            total_trades: 0,
            win_rate: 0.0,
            trades: Vec::new(),
            equity_curve: Vec::new(),
            max_drawdown: 0.0,
            stats: TradeStats::default(),
            open_at_end: false,
        }
    }
}

pub fn backtest(frame: &IndicatorFrame, profile: Profile) -> BacktestResult {
    run_backtest(frame, profile, &BacktestConfig::default())
}

pub fn run_backtest(frame: &IndicatorFrame, profile: Profile, config: &BacktestConfig) -> BacktestResult {
    if frame.len() <= config.warmup_bars {
        return BacktestResult::empty(config.initial_capital);
    }

    let mut state = PositionState::Flat;
    let mut cash = config.initial_capital;
    let mut trades: Vec<Trade> = Vec::new();
    let mut equity_curve = Vec::with_capacity(frame.len() - config.warmup_bars);
    let rows = frame.rows();
    let bars: Vec<PriceBar> = frame.bars().cloned().collect();

    for (i, row) in rows.iter().enumerate().skip(config.warmup_bars) {
        let close = row.close();

        state = match state {
            PositionState::Flat => {
                let inputs = ScoreInputs {
                    cagr: config.cagr.or_else(|| trailing_cagr_3y(&bars[..=i])),
                    ..ScoreInputs::default()
                };
                let verdict = score(frame.prefix(i + 1), profile, &inputs);
                match (verdict.is_buy(), verdict.stop, verdict.target) {
                    (true, Some(stop), Some(target)) if close > 0.0 && cash > 0.0 => {
                        let shares = cash / close;
                        debug!(date = %row.date(), close, stop, target, "enter");
                        trades.push(Trade {
                            date: row.date(),
                            side: TradeSide::Buy,
                            price: close,
                            shares,
                            reason: verdict.archetype.to_string(),
                            profit: None,
                        });
                        let open = OpenTrade {
                            entry_date: row.date(),
                            entry_price: close,
                            stop,
                            target,
                            shares,
                            capital_before: cash,
                        };
                        cash = 0.0;
                        PositionState::InTrade(open)
                    }
                    _ => PositionState::Flat,
                }
            }
            PositionState::InTrade(open) => match open.exit_signal(close) {
                Some(reason) => {
                    let proceeds = open.shares * close;
                    let profit = proceeds - open.capital_before;
                    debug!(date = %row.date(), close, %reason, profit, "exit");
                    trades.push(Trade {
                        date: row.date(),
                        side: TradeSide::Sell,
                        price: close,
                        shares: open.shares,
                        reason: reason.to_string(),
                        profit: Some(profit),
                    });
                    cash = proceeds;
                    PositionState::Flat
                }
                None => PositionState::InTrade(open),
            },
        };

        let equity = match &state {
            PositionState::Flat => cash,
            PositionState::InTrade(open) => open.shares * close,
        };
        equity_curve.push(EquityPoint {
            date: row.date(),
            equity,
        });
    }

    let final_capital = equity_curve
        .last()
        .map(|p| p.equity)
        .unwrap_or(config.initial_capital);
    let profits: Vec<f64> = trades.iter().filter_map(|t| t.profit).collect();
    let stats = TradeStats::compute(&profits);
    let (max_drawdown, _) = compute_drawdown(&equity_curve);

    BacktestResult {
        initial_capital: config.initial_capital,
        final_capital,
        return_pct: return_pct(config.initial_capital, final_capital),
        total_trades: trades.len(),
        win_rate: stats.win_rate,
        trades,
        equity_curve,
        max_drawdown,
        stats,
        open_at_end: matches!(state, PositionState::InTrade(_)),
    }
}
