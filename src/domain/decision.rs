//! Multi-factor decision engine.
//!
//! `score` is a pure function of the indicator rows and the optional
//! fundamental inputs. Missing inputs contribute nothing; they never fail.

use serde::Serialize;
use tracing::debug;

use crate::domain::archetype::{Archetype, ClassifyContext, Decision, apply_growth_override, classify};
use crate::domain::factors::{FactorInputs, FactorScores, MISSING_RATE, score_factors};
use crate::domain::frame::IndicatorRow;
use crate::domain::fundamentals::FundamentalSnapshot;
use crate::domain::narrative::{factor_bullets, pros_cons};
use crate::domain::profile::Profile;
use crate::domain::regime::MarketRegime;

/// Rows needed before the engine will form an opinion.
pub const MIN_ROWS: usize = 50;

const VETO_SCORE: u8 = 10;
const TARGET_R_MULTIPLE: f64 = 2.5;
const HIGH_VOL_ATR_PCT: f64 = 3.0;
const LOW_VOL_ATR_PCT: f64 = 1.2;
const NEUTRAL_RSI: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Volatility {
    Low,
    Normal,
    High,
}

impl Volatility {
    pub fn from_atr_pct(atr_pct: Option<f64>) -> Self {
        match atr_pct {
            Some(p) if p > HIGH_VOL_ATR_PCT => Volatility::High,
            Some(p) if p < LOW_VOL_ATR_PCT => Volatility::Low,
            _ => Volatility::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Framework {
    Invest,
    Trader,
    Swing,
    Avoid,
    Wait,
}

impl Framework {
    fn select(decision: Decision, profile: Profile) -> Self {
        match decision {
            Decision::Avoid => Framework::Avoid,
            Decision::Wait | Decision::Watch => Framework::Wait,
            Decision::Swing => Framework::Swing,
            Decision::Buy | Decision::Accumulate => match profile {
                Profile::Investor => Framework::Invest,
                Profile::Trader => Framework::Trader,
                Profile::Swing => Framework::Swing,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionResult {
    pub decision: Decision,
    pub archetype: Archetype,
    pub score: u8,
    pub reason: String,
    pub bullets: Vec<String>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub factors: FactorScores,
    pub stop: Option<f64>,
    pub target: Option<f64>,
    pub atr: Option<f64>,
    pub rsi: Option<f64>,
    pub volatility: Volatility,
    pub framework: Framework,
    pub short_trend: String,
    pub long_trend: String,
    pub entry_hint: String,
}

impl DecisionResult {
    pub fn insufficient_data() -> Self {
        Self {
            decision: Decision::Wait,
            archetype: Archetype::InsufficientData,
            score: 0,
            reason: "Insufficient Data".to_string(),
            bullets: Vec::new(),
            pros: Vec::new(),
            cons: Vec::new(),
            factors: FactorScores::neutral(),
            stop: None,
            target: None,
            atr: None,
            rsi: None,
            volatility: Volatility::Normal,
            framework: Framework::Wait,
            short_trend: "n/a".to_string(),
            long_trend: "n/a".to_string(),
            entry_hint: String::new(),
        }
    }

    pub fn is_buy(&self) -> bool {
        self.decision == Decision::Buy
    }
}

/// Optional context for [`score`]. A missing ROCE or CAGR counts as 0%
/// and a missing regime as neutral.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreInputs<'a> {
    pub fundamentals: Option<&'a FundamentalSnapshot>,
    /// Current ROCE in percent.
    pub roce: Option<f64>,
    /// Trailing three-year CAGR in percent.
    pub cagr: Option<f64>,
    pub regime: Option<MarketRegime>,
}

pub fn score(rows: &[IndicatorRow], profile: Profile, inputs: &ScoreInputs<'_>) -> DecisionResult {
    let Some(last) = rows.last().filter(|_| rows.len() >= MIN_ROWS) else {
        return DecisionResult::insufficient_data();
    };

    let regime = inputs.regime.unwrap_or_default();
    let close = last.close();
    let (stop, target) = risk_levels(close, last.atr14, profile);
    let volatility = Volatility::from_atr_pct(last.atr_pct);
    let short_trend = short_trend(last);
    let long_trend = long_trend(last);

    if profile == Profile::Investor && inputs.roce.is_some_and(|r| r < 0.0) {
        debug!(roce = inputs.roce, "capital destroyer veto");
        return DecisionResult {
            decision: Decision::Avoid,
            archetype: Archetype::CapitalDestroyer,
            score: VETO_SCORE,
            reason: format!(
                "Capital Destroyer: negative return on capital employed ({:.1}%).",
                inputs.roce.unwrap_or_default()
            ),
            bullets: Vec::new(),
            pros: Vec::new(),
            cons: vec!["Negative ROCE destroys shareholder capital.".to_string()],
            factors: FactorScores::neutral(),
            stop,
            target,
            atr: last.atr14,
            rsi: last.rsi14,
            volatility,
            framework: Framework::Avoid,
            short_trend,
            long_trend,
            entry_hint: String::new(),
        };
    }

    let factor_inputs = FactorInputs::gather(inputs.fundamentals, inputs.roce, inputs.cagr);
    let factors = score_factors(&factor_inputs, last, &regime);
    let composite = factors.weighted(&profile.weights()) + f64::from(regime.score_impact);
    let composite = composite.clamp(0.0, 100.0) as u8;

    let bullets = factor_bullets(&factors, &factor_inputs, last.rsi14, &regime);

    let ctx = ClassifyContext {
        close,
        ma50: last.ma50,
        ma200: last.ma200,
        rsi: last.rsi14.unwrap_or(NEUTRAL_RSI),
        factors,
        score: composite,
    };
    let (archetype, decision) = classify(&ctx);
    let (archetype, decision, final_score) = apply_growth_override(
        archetype,
        decision,
        composite,
        inputs.cagr.unwrap_or(MISSING_RATE),
    );

    let (pros, cons) = pros_cons(last, &factors);
    let entry_hint = entry_hint(decision, last);
    let framework = Framework::select(decision, profile);

    debug!(
        %profile,
        score = final_score,
        %decision,
        %archetype,
        "scored"
    );

    DecisionResult {
        decision,
        archetype,
        score: final_score,
        reason: format!("{archetype}: {}", bullets.join(" ")),
        bullets,
        pros,
        cons,
        factors,
        stop,
        target,
        atr: last.atr14,
        rsi: last.rsi14,
        volatility,
        framework,
        short_trend,
        long_trend,
        entry_hint,
    }
}

fn risk_levels(close: f64, atr: Option<f64>, profile: Profile) -> (Option<f64>, Option<f64>) {
    match atr {
        Some(atr) => {
            let k = profile.stop_atr_multiple();
            (Some(close - k * atr), Some(close + k * TARGET_R_MULTIPLE * atr))
        }
        None => (None, None),
    }
}

fn short_trend(row: &IndicatorRow) -> String {
    match (row.ma20, row.ma50) {
        (Some(a), Some(b)) if a > b => "Bullish",
        (Some(_), Some(_)) => "Bearish",
        _ => "n/a",
    }
    .to_string()
}

fn long_trend(row: &IndicatorRow) -> String {
    match (row.ma50, row.ma200) {
        (Some(a), Some(b)) if a > b => "Uptrend",
        (Some(_), Some(_)) => "Downtrend",
        _ => "n/a",
    }
    .to_string()
}

fn entry_hint(decision: Decision, row: &IndicatorRow) -> String {
    if decision == Decision::Buy {
        return "Buy @ MA20".to_string();
    }
    match row.ma20 {
        Some(ma20) if row.close() < ma20 => "Reclaim > MA20".to_string(),
        _ => "Support MA20".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::frame::compute_indicators;
    use crate::domain::fundamentals::{PEG_RATIO, RETURN_ON_EQUITY, TRAILING_PE};
    use crate::domain::ohlcv::PriceBar;
    use crate::domain::regime::MarketStatus;
    use chrono::NaiveDate;

    fn trending(n: usize, step: f64) -> Vec<IndicatorRow> {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let bars: Vec<PriceBar> = (0..n)
            .map(|i| {
                // small zig-zag keeps RSI off the rails
                let wiggle = if i % 2 == 0 { 0.4 } else { -0.4 };
                let close = 100.0 + step * i as f64 + wiggle;
                PriceBar {
                    date: start + chrono::Duration::days(i as i64),
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1_000.0,
                }
            })
            .collect();
        compute_indicators(&bars).rows().to_vec()
    }

    #[test]
    fn too_few_rows_is_neutral_wait() {
        let rows = trending(49, 0.5);
        let result = score(&rows, Profile::Trader, &ScoreInputs::default());
        assert_eq!(result.decision, Decision::Wait);
        assert_eq!(result.score, 0);
        assert_eq!(result.reason, "Insufficient Data");
    }

    #[test]
    fn investor_veto_on_negative_roce() {
        let rows = trending(260, 0.5);
        let snap = FundamentalSnapshot::new()
            .with_ratio(PEG_RATIO, 0.5)
            .with_ratio(TRAILING_PE, 10.0);
        let inputs = ScoreInputs {
            fundamentals: Some(&snap),
            roce: Some(-5.0),
            cagr: Some(30.0),
            regime: Some(MarketRegime::new(MarketStatus::Bull, 20)),
        };
        let result = score(&rows, Profile::Investor, &inputs);
        assert_eq!(result.decision, Decision::Avoid);
        assert_eq!(result.archetype, Archetype::CapitalDestroyer);
        assert_eq!(result.score, 10);
        assert!(result.stop.is_some());
    }

    #[test]
    fn trader_ignores_roce_veto() {
        let rows = trending(260, 0.5);
        let inputs = ScoreInputs {
            roce: Some(-5.0),
            ..ScoreInputs::default()
        };
        let result = score(&rows, Profile::Trader, &inputs);
        assert_ne!(result.archetype, Archetype::CapitalDestroyer);
    }

    #[test]
    fn downtrend_is_avoided() {
        let rows = trending(260, -0.3);
        let result = score(&rows, Profile::Trader, &ScoreInputs::default());
        assert_eq!(result.decision, Decision::Avoid);
        assert!(matches!(
            result.archetype,
            Archetype::FallingKnife | Archetype::BrokenTrend
        ));
        assert_eq!(result.framework, Framework::Avoid);
        assert_eq!(result.long_trend, "Downtrend");
    }

    #[test]
    fn strong_uptrend_buy_downgraded_by_stagnant_cagr() {
        let rows = trending(260, 0.5);
        let regime = Some(MarketRegime::new(MarketStatus::Bull, 30));
        let buy = score(
            &rows,
            Profile::Trader,
            &ScoreInputs {
                roce: Some(10.0),
                cagr: Some(10.0),
                regime,
                ..ScoreInputs::default()
            },
        );
        assert_eq!(buy.decision, Decision::Buy);
        assert_eq!(buy.entry_hint, "Buy @ MA20");
        assert!(buy.score > 75);

        let swing = score(
            &rows,
            Profile::Trader,
            &ScoreInputs {
                roce: Some(10.0),
                cagr: Some(3.0),
                regime,
                ..ScoreInputs::default()
            },
        );
        assert_eq!(swing.decision, Decision::Swing);
        assert_eq!(swing.archetype, Archetype::SwingTrade);
        assert_eq!(swing.score, 75);
        assert_eq!(swing.framework, Framework::Swing);
    }

    #[test]
    fn missing_inputs_score_as_zero_rates() {
        let rows = trending(260, 0.5);
        let regime = Some(MarketRegime::new(MarketStatus::Bull, 30));
        let missing = score(
            &rows,
            Profile::Trader,
            &ScoreInputs {
                regime,
                ..ScoreInputs::default()
            },
        );
        let zeros = score(
            &rows,
            Profile::Trader,
            &ScoreInputs {
                roce: Some(0.0),
                cagr: Some(0.0),
                regime,
                ..ScoreInputs::default()
            },
        );
        assert_eq!(missing.factors, zeros.factors);
        assert_eq!(missing.factors.quality, 35);
        assert_eq!(missing.score, zeros.score);
        assert_eq!(missing.decision, zeros.decision);
        assert_eq!(missing.archetype, zeros.archetype);
        // a 0% CAGR never confirms a BUY
        assert_ne!(missing.decision, Decision::Buy);
    }

    #[test]
    fn quality_compounder_with_fundamentals() {
        let rows = trending(260, 0.5);
        let snap = FundamentalSnapshot::new().with_ratio(RETURN_ON_EQUITY, 0.30);
        let inputs = ScoreInputs {
            fundamentals: Some(&snap),
            roce: Some(30.0),
            cagr: Some(25.0),
            regime: None,
        };
        let result = score(&rows, Profile::Investor, &inputs);
        assert_eq!(result.factors.quality, 90);
        assert_eq!(result.factors.growth, 80);
        assert_eq!(result.archetype, Archetype::QualityCompounder);
        assert!(matches!(result.decision, Decision::Buy | Decision::Accumulate));
    }

    #[test]
    fn risk_levels_scale_with_profile() {
        let rows = trending(260, 0.5);
        let last = rows.last().unwrap();
        let atr = last.atr14.unwrap();
        let r = score(&rows, Profile::Investor, &ScoreInputs::default());
        let stop = r.stop.unwrap();
        let target = r.target.unwrap();
        assert!((last.close() - stop - 2.5 * atr).abs() < 1e-9);
        assert!((target - last.close() - 2.5 * 2.5 * atr).abs() < 1e-9);

        let r = score(&rows, Profile::Swing, &ScoreInputs::default());
        assert!((last.close() - r.stop.unwrap() - 1.5 * atr).abs() < 1e-9);
    }

    #[test]
    fn score_clamped_under_extreme_regime() {
        let rows = trending(260, 0.5);
        let low = score(
            &rows,
            Profile::Trader,
            &ScoreInputs {
                regime: Some(MarketRegime::new(MarketStatus::Bear, -500)),
                ..ScoreInputs::default()
            },
        );
        assert_eq!(low.score, 0);
        assert!(low.bullets.iter().any(|b| b.contains("BEAR")));

        let high = score(
            &rows,
            Profile::Trader,
            &ScoreInputs {
                regime: Some(MarketRegime::new(MarketStatus::Bull, 500)),
                ..ScoreInputs::default()
            },
        );
        assert_eq!(high.score, 100);
    }

    #[test]
    fn volatility_labels() {
        assert_eq!(Volatility::from_atr_pct(Some(3.5)), Volatility::High);
        assert_eq!(Volatility::from_atr_pct(Some(2.0)), Volatility::Normal);
        assert_eq!(Volatility::from_atr_pct(Some(1.0)), Volatility::Low);
        assert_eq!(Volatility::from_atr_pct(None), Volatility::Normal);
    }
}
