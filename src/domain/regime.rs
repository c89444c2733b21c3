//! Broad-market regime used as a global score adjustment.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketStatus {
    Bull,
    Bear,
    Correction,
    BearRally,
    #[default]
    Neutral,
}

impl fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MarketStatus::Bull => "BULL",
            MarketStatus::Bear => "BEAR",
            MarketStatus::Correction => "CORRECTION",
            MarketStatus::BearRally => "BEAR_RALLY",
            MarketStatus::Neutral => "NEUTRAL",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown market status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for MarketStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace([' ', '-'], "_").as_str() {
            "BULL" => Ok(MarketStatus::Bull),
            "BEAR" => Ok(MarketStatus::Bear),
            "CORRECTION" => Ok(MarketStatus::Correction),
            "BEAR_RALLY" => Ok(MarketStatus::BearRally),
            "NEUTRAL" => Ok(MarketStatus::Neutral),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MarketRegime {
    pub status: MarketStatus,
    /// Signed points added to the composite score.
    pub score_impact: i32,
}

impl MarketRegime {
    pub fn new(status: MarketStatus, score_impact: i32) -> Self {
        Self {
            status,
            score_impact,
        }
    }

    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn is_bear(&self) -> bool {
        self.status == MarketStatus::Bear
    }
}
