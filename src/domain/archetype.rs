//! Archetype classification as an ordered rule table.
//!
//! Rules are evaluated top-down and the first whose predicate holds wins:
//!
//! 1. Falling Knife / Broken Trend: close < MA200 and MA50 < MA200.
//! 2. Quality Compounder: Quality > 80 and Growth > 70.
//! 3. Momentum Rocket: Tech > 85, Growth > 60 and Value < 40.
//! 4. Value Trap Risk: Value > 80 and Quality < 50.
//! 5. Score band fallback (always matches).
//!
//! The growth override in [`apply_growth_override`] runs after the table.

use serde::Serialize;
use std::fmt;

use crate::domain::factors::FactorScores;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Buy,
    Accumulate,
    Wait,
    Avoid,
    Swing,
    Watch,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Decision::Buy => "BUY",
            Decision::Accumulate => "ACCUMULATE",
            Decision::Wait => "WAIT",
            Decision::Avoid => "AVOID",
            Decision::Swing => "SWING",
            Decision::Watch => "WATCH",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Archetype {
    #[serde(rename = "Insufficient Data")]
    InsufficientData,
    #[serde(rename = "Capital Destroyer")]
    CapitalDestroyer,
    #[serde(rename = "Falling Knife")]
    FallingKnife,
    #[serde(rename = "Broken Trend")]
    BrokenTrend,
    #[serde(rename = "Quality Compounder")]
    QualityCompounder,
    #[serde(rename = "Momentum Rocket")]
    MomentumRocket,
    #[serde(rename = "Value Trap Risk")]
    ValueTrapRisk,
    #[serde(rename = "Strong Buy")]
    StrongBuy,
    Accumulate,
    Underperformer,
    Neutral,
    #[serde(rename = "Swing Trade")]
    SwingTrade,
    #[serde(rename = "High Growth Watch")]
    HighGrowthWatch,
}

impl Archetype {
    pub fn label(self) -> &'static str {
        match self {
            Archetype::InsufficientData => "Insufficient Data",
            Archetype::CapitalDestroyer => "Capital Destroyer",
            Archetype::FallingKnife => "Falling Knife",
            Archetype::BrokenTrend => "Broken Trend",
            Archetype::QualityCompounder => "Quality Compounder",
            Archetype::MomentumRocket => "Momentum Rocket",
            Archetype::ValueTrapRisk => "Value Trap Risk",
            Archetype::StrongBuy => "Strong Buy",
            Archetype::Accumulate => "Accumulate",
            Archetype::Underperformer => "Underperformer",
            Archetype::Neutral => "Neutral",
            Archetype::SwingTrade => "Swing Trade",
            Archetype::HighGrowthWatch => "High Growth Watch",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything a rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct ClassifyContext {
    pub close: f64,
    pub ma50: Option<f64>,
    pub ma200: Option<f64>,
    pub rsi: f64,
    pub factors: FactorScores,
    pub score: u8,
}

pub struct ArchetypeRule {
    pub name: &'static str,
    pub applies: fn(&ClassifyContext) -> bool,
    pub verdict: fn(&ClassifyContext) -> (Archetype, Decision),
}

pub const RULES: [ArchetypeRule; 5] = [
    ArchetypeRule {
        name: "broken-structure",
        applies: |c| match (c.ma50, c.ma200) {
            (Some(ma50), Some(ma200)) => c.close < ma200 && ma50 < ma200,
            _ => false,
        },
        verdict: |c| {
            let archetype = if c.rsi < 35.0 {
                Archetype::FallingKnife
            } else {
                Archetype::BrokenTrend
            };
            (archetype, Decision::Avoid)
        },
    },
    ArchetypeRule {
        name: "quality-compounder",
        applies: |c| c.factors.quality > 80 && c.factors.growth > 70,
        verdict: |c| {
            let decision = if c.score > 75 {
                Decision::Buy
            } else {
                Decision::Accumulate
            };
            (Archetype::QualityCompounder, decision)
        },
    },
    ArchetypeRule {
        name: "momentum-rocket",
        applies: |c| c.factors.tech > 85 && c.factors.growth > 60 && c.factors.value < 40,
        verdict: |c| {
            let decision = if c.score > 80 {
                Decision::Buy
            } else {
                Decision::Wait
            };
            (Archetype::MomentumRocket, decision)
        },
    },
    ArchetypeRule {
        name: "value-trap",
        applies: |c| c.factors.value > 80 && c.factors.quality < 50,
        verdict: |_| (Archetype::ValueTrapRisk, Decision::Avoid),
    },
    ArchetypeRule {
        name: "score-band",
        applies: |_| true,
        verdict: |c| match c.score {
            85.. => (Archetype::StrongBuy, Decision::Buy),
            70.. => (Archetype::Accumulate, Decision::Buy),
            ..=40 => (Archetype::Underperformer, Decision::Avoid),
            _ => (Archetype::Neutral, Decision::Wait),
        },
    },
];

pub fn classify(ctx: &ClassifyContext) -> (Archetype, Decision) {
    RULES
        .iter()
        .find(|rule| (rule.applies)(ctx))
        .map(|rule| (rule.verdict)(ctx))
        .unwrap_or((Archetype::Neutral, Decision::Wait))
}

pub const SWING_SCORE_CAP: u8 = 75;
const STAGNANT_CAGR: f64 = 5.0;
const HIGH_GROWTH_CAGR: f64 = 20.0;

/// Reclassify by trailing growth once the rule table has decided.
pub fn apply_growth_override(
    archetype: Archetype,
    decision: Decision,
    score: u8,
    cagr: f64,
) -> (Archetype, Decision, u8) {
    match decision {
        Decision::Buy if cagr < STAGNANT_CAGR => {
            (Archetype::SwingTrade, Decision::Swing, score.min(SWING_SCORE_CAP))
        }
        Decision::Wait | Decision::Avoid if cagr > HIGH_GROWTH_CAGR => {
            (Archetype::HighGrowthWatch, Decision::Watch, score)
        }
        _ => (archetype, decision, score),
    }
}
