//! Single- and two-candle pattern detection on the most recent bars.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use crate::domain::frame::IndicatorFrame;
use crate::domain::ohlcv::PriceBar;

const MIN_BARS: usize = 5;
const MIN_RANGE: f64 = 0.0001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CandlePattern {
    Doji,
    Hammer,
    #[serde(rename = "Inverted Hammer")]
    InvertedHammer,
    #[serde(rename = "Shooting Star")]
    ShootingStar,
    #[serde(rename = "Bullish Engulfing")]
    BullishEngulfing,
    #[serde(rename = "Bearish Engulfing")]
    BearishEngulfing,
    #[serde(rename = "Bullish Harami")]
    BullishHarami,
    #[serde(rename = "Bearish Harami")]
    BearishHarami,
}

impl CandlePattern {
    pub fn name(self) -> &'static str {
        match self {
            CandlePattern::Doji => "Doji",
            CandlePattern::Hammer => "Hammer",
            CandlePattern::InvertedHammer => "Inverted Hammer",
            CandlePattern::ShootingStar => "Shooting Star",
            CandlePattern::BullishEngulfing => "Bullish Engulfing",
            CandlePattern::BearishEngulfing => "Bearish Engulfing",
            CandlePattern::BullishHarami => "Bullish Harami",
            CandlePattern::BearishHarami => "Bearish Harami",
        }
    }

    pub fn meaning(self) -> &'static str {
        match self {
            CandlePattern::Doji => "Indecision: open roughly equals close.",
            CandlePattern::Hammer => "Possible bullish reversal found at bottoms.",
            CandlePattern::InvertedHammer => "Possible bullish reversal attempt.",
            CandlePattern::ShootingStar => "Bearish reversal signal found at tops.",
            CandlePattern::BullishEngulfing => "Strong bullish move swallowing previous red candle.",
            CandlePattern::BearishEngulfing => "Strong bearish move swallowing previous green candle.",
            CandlePattern::BullishHarami => "Downtrend pausing (small green inside large red).",
            CandlePattern::BearishHarami => "Uptrend pausing (small red inside large green).",
        }
    }
}

impl fmt::Display for CandlePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternMatch {
    pub date: NaiveDate,
    pub pattern: CandlePattern,
    pub meaning: &'static str,
}

/// Classify `curr` given the previous session. First match wins.
pub fn classify_candle(prev: &PriceBar, curr: &PriceBar) -> Option<CandlePattern> {
    let (o, h, l, c) = (curr.open, curr.high, curr.low, curr.close);
    let body = (c - o).abs();
    let range = (h - l).max(MIN_RANGE);
    let upper_wick = h - o.max(c);
    let lower_wick = o.min(c) - l;

    let prev_body = (prev.close - prev.open).abs();
    let prev_green = prev.close > prev.open;
    let curr_green = c > o;

    if body <= 0.15 * range {
        Some(CandlePattern::Doji)
    } else if lower_wick >= 2.0 * body && upper_wick <= 0.3 * body {
        Some(CandlePattern::Hammer)
    } else if upper_wick >= 2.0 * body && lower_wick <= 0.3 * body {
        if prev.close < prev.open {
            Some(CandlePattern::InvertedHammer)
        } else {
            Some(CandlePattern::ShootingStar)
        }
    } else if body > prev_body && c > prev.open && o < prev.close && curr_green && !prev_green {
        Some(CandlePattern::BullishEngulfing)
    } else if body > prev_body && c < prev.open && o > prev.close && !curr_green && prev_green {
        Some(CandlePattern::BearishEngulfing)
    } else if body < prev_body * 0.7 && o < prev.close && c > prev.open && !curr_green && prev_green {
        Some(CandlePattern::BearishHarami)
    } else if body < prev_body * 0.7 && o > prev.close && c < prev.open && curr_green && !prev_green {
        Some(CandlePattern::BullishHarami)
    } else {
        None
    }
}

/// Patterns over the last `n_days` sessions, newest first.
pub fn detect_patterns(frame: &IndicatorFrame, n_days: usize) -> Vec<PatternMatch> {
    if frame.len() < MIN_BARS {
        return Vec::new();
    }
    let rows = frame.rows();
    let tail = &rows[rows.len().saturating_sub(n_days + 2)..];

    let mut found: Vec<PatternMatch> = tail
        .windows(2)
        .filter_map(|w| {
            classify_candle(&w[0].bar, &w[1].bar).map(|pattern| PatternMatch {
                date: w[1].date(),
                pattern,
                meaning: pattern.meaning(),
            })
        })
        .collect();

    found.reverse();
    found.truncate(n_days);
    found
}
