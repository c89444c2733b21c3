//! Four 0-100 style scores: value, momentum, quality, stability.

use serde::Serialize;

use crate::domain::frame::IndicatorFrame;
use crate::domain::fundamentals::{BETA, FundamentalSnapshot, PROFIT_MARGINS, RETURN_ON_EQUITY, TRAILING_PE};

const DEFAULT_PE: f64 = 50.0;
const DEFAULT_RSI: f64 = 50.0;
const DEFAULT_BETA: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuantDna {
    pub value: u8,
    pub momentum: u8,
    pub quality: u8,
    pub stability: u8,
}

pub fn quant_dna(snapshot: &FundamentalSnapshot, frame: &IndicatorFrame) -> Option<QuantDna> {
    let last = frame.last()?;

    let pe = snapshot.ratio(TRAILING_PE).unwrap_or(DEFAULT_PE);
    let value = 100.0 - pe * 1.5;

    let mut momentum = last.rsi14.unwrap_or(DEFAULT_RSI);
    if last.ma50.is_some_and(|ma50| last.close() > ma50) {
        momentum += 10.0;
    }

    let margins = snapshot.ratio(PROFIT_MARGINS).unwrap_or(0.0);
    let roe = snapshot.ratio(RETURN_ON_EQUITY).unwrap_or(0.0);
    let quality = margins * 100.0 * 2.5 + roe * 100.0 * 1.5;

    let beta = snapshot.ratio(BETA).unwrap_or(DEFAULT_BETA);
    let stability = 120.0 - beta * 50.0;

    Some(QuantDna {
        value: to_score(value),
        momentum: to_score(momentum),
        quality: to_score(quality),
        stability: to_score(stability),
    })
}

fn to_score(raw: f64) -> u8 {
    raw.clamp(0.0, 100.0) as u8
}
