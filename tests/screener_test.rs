//! Batch screening over a mock price source.

mod common;

use common::*;
use tickerscope::domain::archetype::Decision;
use tickerscope::domain::profile::Profile;
use tickerscope::domain::regime::{MarketRegime, MarketStatus};
use tickerscope::domain::screener::{ScreenOutcome, ScreenRequest, SkipReason, screen_universe};

fn end() -> chrono::NaiveDate {
    date(2024, 12, 31)
}

fn request() -> ScreenRequest {
    ScreenRequest::new(end(), Profile::Trader)
}

/// 300 bars ending on `end()`.
fn history(base: f64, step: f64) -> Vec<PriceBar> {
    let start = end() - chrono::Duration::days(299);
    trending_bars(start, 300, base, step)
}

fn tickers(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn universe() -> MockDataPort {
    MockDataPort::new()
        .with_bars("UP", history(50.0, 0.3))
        .with_bars("DOWN", history(200.0, -0.4))
        .with_bars("SHORT", history(50.0, 0.1).split_off(280))
        .with_error("BROKEN", "vendor timeout")
        .with_panic("BOOM")
}

#[test]
fn outcomes_follow_input_order() {
    let port = universe();
    let names = tickers(&["SHORT", "UP", "MISSING", "DOWN", "BROKEN", "BOOM"]);
    let outcomes = screen_universe(&port, &names, &request(), 3);

    let got: Vec<&str> = outcomes.iter().map(|o| o.ticker()).collect();
    assert_eq!(got, vec!["SHORT", "UP", "MISSING", "DOWN", "BROKEN", "BOOM"]);
    assert_eq!(port.call_count(), names.len());
}

#[test]
fn short_and_missing_histories_are_skipped() {
    let port = universe();
    let outcomes = screen_universe(&port, &tickers(&["SHORT", "MISSING"]), &request(), 2);

    assert_eq!(
        outcomes[0],
        ScreenOutcome::Skipped {
            ticker: "SHORT".into(),
            reason: SkipReason::InsufficientBars {
                bars: 20,
                minimum: 60
            },
        }
    );
    assert_eq!(
        outcomes[1],
        ScreenOutcome::Skipped {
            ticker: "MISSING".into(),
            reason: SkipReason::NoData,
        }
    );
}

#[test]
fn port_error_and_panic_stay_isolated() {
    let port = universe();
    let outcomes = screen_universe(&port, &tickers(&["BROKEN", "BOOM", "UP"]), &request(), 2);

    match &outcomes[0] {
        ScreenOutcome::Failed { ticker, reason } => {
            assert_eq!(ticker, "BROKEN");
            assert!(reason.contains("vendor timeout"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    match &outcomes[1] {
        ScreenOutcome::Failed { ticker, reason } => {
            assert_eq!(ticker, "BOOM");
            assert!(reason.contains("vendor blew up"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(matches!(outcomes[2], ScreenOutcome::Scored(_)));
}

#[test]
fn scored_row_summarises_last_bar() {
    let port = universe();
    let bars = history(50.0, 0.3);
    let outcomes = screen_universe(&port, &tickers(&["UP"]), &request(), 1);

    let ScreenOutcome::Scored(row) = &outcomes[0] else {
        panic!("expected a scored row");
    };
    let last = &bars[bars.len() - 1];
    let prev = &bars[bars.len() - 2];
    assert_eq!(row.last_close, last.close);
    assert!((row.change.unwrap() - (last.close - prev.close)).abs() < 1e-9);
    assert_eq!(row.volume, last.volume);
    assert!(row.change_pct.is_some());
    assert!(row.dist_ma20_pct.unwrap() > 0.0);
    assert!(row.decision.score <= 100);
}

#[test]
fn uptrend_ranks_above_downtrend() {
    let port = universe();
    let outcomes = screen_universe(&port, &tickers(&["UP", "DOWN"]), &request(), 2);
    let score = |o: &ScreenOutcome| match o {
        ScreenOutcome::Scored(row) => row.decision.score,
        other => panic!("expected a scored row, got {other:?}"),
    };
    assert!(score(&outcomes[0]) > score(&outcomes[1]));
    if let ScreenOutcome::Scored(row) = &outcomes[1] {
        assert_ne!(row.decision.decision, Decision::Buy);
    }
}

#[test]
fn concurrency_does_not_change_results() {
    let port = universe();
    let names = tickers(&["UP", "DOWN", "SHORT", "MISSING", "BROKEN"]);
    let serial = screen_universe(&port, &names, &request(), 1);
    let parallel = screen_universe(&port, &names, &request(), 8);
    assert_eq!(serial, parallel);
}

#[test]
fn regime_impact_shifts_scores() {
    let port = universe();
    let names = tickers(&["UP"]);
    let neutral = screen_universe(&port, &names, &request(), 1);

    let mut bear = request();
    bear.regime = Some(MarketRegime::new(MarketStatus::Bear, -15));
    let bearish = screen_universe(&port, &names, &bear, 1);

    match (&neutral[0], &bearish[0]) {
        (ScreenOutcome::Scored(a), ScreenOutcome::Scored(b)) => {
            assert!(b.decision.score <= a.decision.score);
            assert!(b.decision.factors.market < a.decision.factors.market);
        }
        other => panic!("expected scored rows, got {other:?}"),
    }
}

#[test]
fn single_bar_history_scores_without_change() {
    let port = MockDataPort::new().with_bars("ONE", history(50.0, 0.3).split_off(299));
    let mut req = request();
    req.min_bars = 1;
    let outcomes = screen_universe(&port, &tickers(&["ONE"]), &req, 1);

    let ScreenOutcome::Scored(row) = &outcomes[0] else {
        panic!("expected a scored row, got {:?}", outcomes[0]);
    };
    assert_eq!(row.change, None);
    assert_eq!(row.change_pct, None);
    assert_eq!(row.decision.reason, "Insufficient Data");
}

#[test]
fn empty_universe_is_empty() {
    let port = MockDataPort::new();
    assert!(screen_universe(&port, &[], &request(), 4).is_empty());
}
