//! Backtest statistics from the trade log and equity curve.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TradeStats {
    pub trades_won: usize,
    pub trades_lost: usize,
    pub trades_breakeven: usize,
    /// Fraction of closed trades with positive profit, in [0, 1].
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
}

impl TradeStats {
    /// `profits` holds one realised profit per closed trade.
    pub fn compute(profits: &[f64]) -> Self {
        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut trades_breakeven = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;

        for &pnl in profits {
            if pnl > 0.0 {
                trades_won += 1;
                total_wins += pnl;
                largest_win = largest_win.max(pnl);
            } else if pnl < 0.0 {
                trades_lost += 1;
                total_losses += pnl.abs();
                largest_loss = largest_loss.max(pnl.abs());
            } else {
                trades_breakeven += 1;
            }
        }

        let total = profits.len();
        let win_rate = if total > 0 {
            trades_won as f64 / total as f64
        } else {
            0.0
        };

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let avg_win = if trades_won > 0 {
            total_wins / trades_won as f64
        } else {
            0.0
        };
        let avg_loss = if trades_lost > 0 {
            total_losses / trades_lost as f64
        } else {
            0.0
        };

        TradeStats {
            trades_won,
            trades_lost,
            trades_breakeven,
            win_rate,
            profit_factor,
            avg_win,
            avg_loss,
            largest_win,
            largest_loss,
        }
    }
}

/// Maximum peak-to-trough drawdown as a fraction, and its length in bars.
pub fn compute_drawdown(equity_curve: &[EquityPoint]) -> (f64, i64) {
    let Some(first) = equity_curve.first() else {
        return (0.0, 0);
    };

    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;
    let mut max_dd_duration = 0i64;
    let mut current_dd_duration = 0i64;

    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
            current_dd_duration = 0;
        } else if peak > 0.0 && point.equity < peak {
            max_dd = max_dd.max((peak - point.equity) / peak);
            current_dd_duration += 1;
            max_dd_duration = max_dd_duration.max(current_dd_duration);
        }
    }

    (max_dd, max_dd_duration)
}

pub fn return_pct(initial: f64, final_value: f64) -> f64 {
    if initial > 0.0 {
        (final_value - initial) / initial * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_equity_curve(values: &[f64]) -> Vec<EquityPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| EquityPoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64),
                equity: v,
            })
            .collect()
    }

    #[test]
    fn stats_empty() {
        let stats = TradeStats::compute(&[]);
        assert_eq!(stats, TradeStats::default());
    }

    #[test]
    fn stats_wins_losses_breakeven() {
        let stats = TradeStats::compute(&[100.0, -50.0, 200.0, 0.0]);
        assert_eq!(stats.trades_won, 2);
        assert_eq!(stats.trades_lost, 1);
        assert_eq!(stats.trades_breakeven, 1);
        assert!((stats.win_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn profit_factor() {
        let stats = TradeStats::compute(&[100.0, -50.0, 200.0]);
        assert!((stats.profit_factor - 6.0).abs() < 1e-9);
        assert!(TradeStats::compute(&[10.0]).profit_factor.is_infinite());
    }

    #[test]
    fn avg_and_largest() {
        let stats = TradeStats::compute(&[100.0, -60.0, 200.0, -40.0]);
        assert!((stats.avg_win - 150.0).abs() < 1e-9);
        assert!((stats.avg_loss - 50.0).abs() < 1e-9);
        assert!((stats.largest_win - 200.0).abs() < 1e-9);
        assert!((stats.largest_loss - 60.0).abs() < 1e-9);
    }

    #[test]
    fn max_drawdown() {
        let curve = make_equity_curve(&[100.0, 110.0, 90.0, 95.0, 80.0, 100.0]);
        let (dd, _) = compute_drawdown(&curve);
        assert!((dd - (110.0 - 80.0) / 110.0).abs() < 1e-9);
    }

    #[test]
    fn max_drawdown_duration() {
        let curve = make_equity_curve(&[100.0, 110.0, 100.0, 90.0, 85.0, 95.0]);
        let (_, duration) = compute_drawdown(&curve);
        assert_eq!(duration, 4);
    }

    #[test]
    fn flat_curve_has_no_drawdown() {
        let curve = make_equity_curve(&[100.0; 5]);
        assert_eq!(compute_drawdown(&curve), (0.0, 0));
    }

    #[test]
    fn return_pct_basic() {
        assert!((return_pct(10_000.0, 11_000.0) - 10.0).abs() < 1e-9);
        assert_eq!(return_pct(0.0, 5.0), 0.0);
    }
}
