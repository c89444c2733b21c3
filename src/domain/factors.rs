//! Per-factor scoring on a 0-100 scale, base 50.

use serde::Serialize;

use crate::domain::frame::IndicatorRow;
use crate::domain::fundamentals::{DEBT_TO_EQUITY, FundamentalSnapshot, RETURN_ON_EQUITY, TRAILING_PE};
use crate::domain::profile::FactorWeights;
use crate::domain::regime::MarketRegime;

const BASE: i32 = 50;
/// ROCE or CAGR used when the input is missing.
pub const MISSING_RATE: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FactorScores {
    pub quality: u8,
    pub value: u8,
    pub growth: u8,
    pub tech: u8,
    /// Reporting only: 50 + regime impact.
    pub market: u8,
}

impl Default for FactorScores {
    fn default() -> Self {
        Self::neutral()
    }
}

impl FactorScores {
    pub fn neutral() -> Self {
        Self {
            quality: BASE as u8,
            value: BASE as u8,
            growth: BASE as u8,
            tech: BASE as u8,
            market: BASE as u8,
        }
    }

    /// Weighted sum of the four scored factors, before the regime impact.
    pub fn weighted(&self, w: &FactorWeights) -> f64 {
        f64::from(self.quality) * w.quality
            + f64::from(self.value) * w.value
            + f64::from(self.growth) * w.growth
            + f64::from(self.tech) * w.tech
    }
}

/// Fundamental drivers behind the Quality, Value and Growth factors.
/// ROCE and CAGR are percent; ROE is a fraction; debt/equity is percent.
/// A missing ROCE or CAGR scores as [`MISSING_RATE`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FactorInputs {
    pub roce: Option<f64>,
    pub roe: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub peg: Option<f64>,
    pub pe: Option<f64>,
    pub cagr: Option<f64>,
}

impl FactorInputs {
    pub fn gather(
        fundamentals: Option<&FundamentalSnapshot>,
        roce: Option<f64>,
        cagr: Option<f64>,
    ) -> Self {
        let ratio = |key: &str| fundamentals.and_then(|f| f.ratio(key));
        Self {
            roce,
            roe: ratio(RETURN_ON_EQUITY),
            debt_to_equity: ratio(DEBT_TO_EQUITY),
            peg: fundamentals.and_then(FundamentalSnapshot::peg),
            pe: ratio(TRAILING_PE),
            cagr,
        }
    }

    pub fn roe_pct(&self) -> Option<f64> {
        self.roe.map(|r| r * 100.0)
    }
}

pub fn score_factors(inputs: &FactorInputs, row: &IndicatorRow, regime: &MarketRegime) -> FactorScores {
    FactorScores {
        quality: quality_score(inputs),
        value: value_score(inputs),
        growth: growth_score(inputs),
        tech: tech_score(row),
        market: clamp_score(BASE + regime.score_impact),
    }
}

pub fn quality_score(inputs: &FactorInputs) -> u8 {
    let mut s = BASE;
    let roce = inputs.roce.unwrap_or(MISSING_RATE);
    if roce > 25.0 {
        s += 25;
    } else if roce > 15.0 {
        s += 15;
    } else if roce < 8.0 {
        s -= 15;
    }
    if inputs.roe_pct().is_some_and(|roe| roe > 20.0) {
        s += 15;
    }
    if inputs.debt_to_equity.is_some_and(|de| de > 200.0) {
        s -= 25;
    }
    clamp_score(s)
}

pub fn value_score(inputs: &FactorInputs) -> u8 {
    let mut s = BASE;
    match inputs.peg {
        Some(peg) if peg > 0.0 && peg < 1.0 => s += 30,
        Some(peg) if peg > 2.0 => s -= 20,
        _ => {}
    }
    if inputs.pe.is_some_and(|pe| pe > 0.0 && pe < 15.0) {
        s += 20;
    }
    clamp_score(s)
}

pub fn growth_score(inputs: &FactorInputs) -> u8 {
    let cagr = inputs.cagr.unwrap_or(MISSING_RATE);
    let s = if cagr > 20.0 {
        BASE + 30
    } else if cagr > 12.0 {
        BASE + 15
    } else if cagr < 0.0 {
        BASE - 25
    } else {
        BASE
    };
    clamp_score(s)
}

pub fn tech_score(row: &IndicatorRow) -> u8 {
    let mut s = BASE;
    let close = row.close();

    if let Some(ma200) = row.ma200 {
        if close > ma200 {
            s += 10;
            if let Some(ma50) = row.ma50.filter(|&m| m > ma200) {
                s += 15;
                if close > ma50 {
                    s += 10;
                }
            }
        } else {
            s -= 15;
            if row.ma50.is_some_and(|m| m < ma200) {
                s -= 10;
            }
        }
    }

    if let Some(rsi) = row.rsi14 {
        if (50.0..=65.0).contains(&rsi) {
            s += 10;
        } else if rsi > 75.0 {
            s -= 5;
        } else if rsi < 30.0 {
            s += 5;
        }
    }

    clamp_score(s)
}

fn clamp_score(s: i32) -> u8 {
    s.clamp(0, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::PriceBar;
    use chrono::NaiveDate;

    fn row(close: f64, ma50: Option<f64>, ma200: Option<f64>, rsi: Option<f64>) -> IndicatorRow {
        IndicatorRow {
            bar: PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 0.0,
            },
            ma20: None,
            ma50,
            ma200,
            rsi14: rsi,
            atr14: None,
            atr_pct: None,
            bollinger: None,
            macd: None,
        }
    }

    #[test]
    fn quality_bands() {
        let base = FactorInputs::default();
        // missing ROCE scores as 0%, below the 8% floor
        assert_eq!(quality_score(&base), 35);
        assert_eq!(quality_score(&FactorInputs { roce: Some(0.0), ..base }), 35);
        assert_eq!(quality_score(&FactorInputs { roce: Some(30.0), ..base }), 75);
        assert_eq!(quality_score(&FactorInputs { roce: Some(20.0), ..base }), 65);
        assert_eq!(quality_score(&FactorInputs { roce: Some(10.0), ..base }), 50);
        assert_eq!(quality_score(&FactorInputs { roce: Some(5.0), ..base }), 35);
        assert_eq!(
            quality_score(&FactorInputs {
                roce: Some(30.0),
                roe: Some(0.25),
                ..base
            }),
            90
        );
        assert_eq!(
            quality_score(&FactorInputs {
                roce: Some(10.0),
                debt_to_equity: Some(250.0),
                ..base
            }),
            25
        );
    }

    #[test]
    fn value_bands() {
        let base = FactorInputs::default();
        assert_eq!(value_score(&FactorInputs { peg: Some(0.7), pe: Some(12.0), ..base }), 100);
        assert_eq!(value_score(&FactorInputs { peg: Some(2.5), ..base }), 30);
        assert_eq!(value_score(&FactorInputs { peg: Some(-1.0), pe: Some(-3.0), ..base }), 50);
    }

    #[test]
    fn growth_bands() {
        let with = |c| growth_score(&FactorInputs { cagr: Some(c), ..FactorInputs::default() });
        assert_eq!(with(25.0), 80);
        assert_eq!(with(15.0), 65);
        assert_eq!(with(5.0), 50);
        assert_eq!(with(-2.0), 25);
        assert_eq!(growth_score(&FactorInputs::default()), 50);
        assert_eq!(with(0.0), 50);
    }

    #[test]
    fn tech_full_uptrend() {
        // close > ma50 > ma200 and RSI in the sweet spot
        assert_eq!(tech_score(&row(120.0, Some(110.0), Some(100.0), Some(55.0))), 95);
    }

    #[test]
    fn tech_above_ma200_but_below_ma50() {
        assert_eq!(tech_score(&row(105.0, Some(110.0), Some(100.0), None)), 75);
    }

    #[test]
    fn tech_downtrend_oversold() {
        assert_eq!(tech_score(&row(80.0, Some(90.0), Some(100.0), Some(25.0))), 30);
    }

    #[test]
    fn tech_without_ma200_only_uses_rsi() {
        assert_eq!(tech_score(&row(80.0, Some(90.0), None, Some(80.0))), 45);
    }

    #[test]
    fn market_reports_regime_impact() {
        let regime = MarketRegime::new(crate::domain::regime::MarketStatus::Bear, -70);
        let scores = score_factors(&FactorInputs::default(), &row(1.0, None, None, None), &regime);
        assert_eq!(scores.market, 0);
    }

    #[test]
    fn gather_reads_snapshot_keys() {
        let snap = FundamentalSnapshot::new()
            .with_ratio(RETURN_ON_EQUITY, 0.3)
            .with_ratio(TRAILING_PE, 12.0)
            .with_ratio(crate::domain::fundamentals::PEG_RATIO, 0.9);
        let inputs = FactorInputs::gather(Some(&snap), Some(18.0), None);
        assert_eq!(inputs.roe, Some(0.3));
        assert_eq!(inputs.pe, Some(12.0));
        assert_eq!(inputs.peg, Some(0.9));
        assert_eq!(inputs.roce, Some(18.0));
        assert_eq!(inputs.debt_to_equity, None);
    }
}
