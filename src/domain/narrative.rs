//! Human-readable explanations: factor bullets, takeaways, pros/cons.

use serde::Serialize;

use crate::domain::factors::{FactorInputs, FactorScores};
use crate::domain::frame::IndicatorRow;
use crate::domain::regime::MarketRegime;

const HIGH_BAND: u8 = 70;
const LOW_BAND: u8 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Band {
    High,
    Mid,
    Low,
}

fn band(score: u8) -> Band {
    if score >= HIGH_BAND {
        Band::High
    } else if score < LOW_BAND {
        Band::Low
    } else {
        Band::Mid
    }
}

fn pct(v: Option<f64>) -> String {
    v.map_or_else(|| "n/a".to_string(), |x| format!("{x:.1}%"))
}

fn num(v: Option<f64>) -> String {
    v.map_or_else(|| "n/a".to_string(), |x| format!("{x:.2}"))
}

/// One bullet per scored factor, plus a market bullet in a bear regime.
pub fn factor_bullets(
    factors: &FactorScores,
    inputs: &FactorInputs,
    rsi: Option<f64>,
    regime: &MarketRegime,
) -> Vec<String> {
    let mut bullets = Vec::with_capacity(5);
    let drivers = format!("ROCE {}, ROE {}", pct(inputs.roce), pct(inputs.roe_pct()));
    bullets.push(match band(factors.quality) {
        Band::High => format!("Quality {}: strong capital efficiency ({drivers}).", factors.quality),
        Band::Low => format!("Quality {}: weak returns on capital ({drivers}).", factors.quality),
        Band::Mid => format!("Quality {}: average profitability ({drivers}).", factors.quality),
    });

    let drivers = format!("PEG {}, P/E {}", num(inputs.peg), num(inputs.pe));
    bullets.push(match band(factors.value) {
        Band::High => format!("Value {}: attractively priced ({drivers}).", factors.value),
        Band::Low => format!("Value {}: expensive for its growth ({drivers}).", factors.value),
        Band::Mid => format!("Value {}: fairly priced ({drivers}).", factors.value),
    });

    let drivers = format!("3y CAGR {}", pct(inputs.cagr));
    bullets.push(match band(factors.growth) {
        Band::High => format!("Growth {}: compounding quickly ({drivers}).", factors.growth),
        Band::Low => format!("Growth {}: shrinking or stalled ({drivers}).", factors.growth),
        Band::Mid => format!("Growth {}: moderate growth ({drivers}).", factors.growth),
    });

    let drivers = format!("RSI {}", rsi.map_or_else(|| "n/a".to_string(), |r| format!("{r:.0}")));
    bullets.push(match band(factors.tech) {
        Band::High => format!("Tech {}: trend and momentum aligned ({drivers}).", factors.tech),
        Band::Low => format!("Tech {}: price structure is weak ({drivers}).", factors.tech),
        Band::Mid => format!("Tech {}: mixed technical picture ({drivers}).", factors.tech),
    });

    if regime.is_bear() {
        bullets.push(format!(
            "Market: broad market is in a BEAR regime ({:+} points).",
            regime.score_impact
        ));
    }

    bullets
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Takeaways {
    pub short: String,
    pub medium: String,
    pub long: String,
}

pub fn takeaways(row: &IndicatorRow) -> Takeaways {
    let short = match row.ma20 {
        Some(ma20) if row.close() > ma20 => "Price is above MA20.".to_string(),
        Some(_) => "Price is below MA20.".to_string(),
        None => "Price vs MA20: n/a.".to_string(),
    };
    let medium = match (row.ma20, row.ma50) {
        (Some(a), Some(b)) if a > b => "Trend is HEALTHY.".to_string(),
        (Some(_), Some(_)) => "Trend is WEAK.".to_string(),
        _ => "Trend: n/a.".to_string(),
    };
    let long = match (row.ma50, row.ma200) {
        (Some(a), Some(b)) if a > b => "Structure is POSITIVE.".to_string(),
        (Some(_), Some(_)) => "Structure is NEGATIVE.".to_string(),
        _ => "Structure: n/a.".to_string(),
    };
    Takeaways { short, medium, long }
}

const OVERSOLD: f64 = 35.0;
const OVERBOUGHT: f64 = 65.0;
const LOW_VOL_ATR_PCT: f64 = 1.5;

/// Short pros/cons lists from the last row and the factor scores.
pub fn pros_cons(row: &IndicatorRow, factors: &FactorScores) -> (Vec<String>, Vec<String>) {
    let mut pros = Vec::new();
    let mut cons = Vec::new();

    match row.ma200 {
        Some(ma200) if row.close() > ma200 => pros.push("Trading above 200-day MA (Bullish).".to_string()),
        Some(_) => cons.push("Trading below 200-day MA (Bearish).".to_string()),
        None => {}
    }

    match row.rsi14 {
        Some(rsi) if rsi < OVERSOLD => pros.push("RSI is Oversold (Potential bounce).".to_string()),
        Some(rsi) if rsi > OVERBOUGHT => cons.push("RSI is Overbought (Caution).".to_string()),
        _ => {}
    }

    if row.atr_pct.is_some_and(|a| a < LOW_VOL_ATR_PCT) {
        pros.push("Volatility is Low (Stable).".to_string());
    }

    for (name, score) in [
        ("Quality", factors.quality),
        ("Value", factors.value),
        ("Growth", factors.growth),
    ] {
        match band(score) {
            Band::High => pros.push(format!("Strong {name} score ({score}).")),
            Band::Low => cons.push(format!("Weak {name} score ({score}).")),
            Band::Mid => {}
        }
    }

    (pros, cons)
}
