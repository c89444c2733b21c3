//! Investor profiles and the factor weights they imply.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Profile {
    Investor,
    #[default]
    Trader,
    Swing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorWeights {
    pub quality: f64,
    pub value: f64,
    pub growth: f64,
    pub tech: f64,
}

impl Profile {
    pub fn weights(self) -> FactorWeights {
        match self {
            Profile::Investor => FactorWeights {
                quality: 0.40,
                value: 0.25,
                growth: 0.20,
                tech: 0.15,
            },
            Profile::Trader | Profile::Swing => FactorWeights {
                quality: 0.15,
                value: 0.15,
                growth: 0.10,
                tech: 0.60,
            },
        }
    }

    /// ATR multiple used for the stop distance.
    pub fn stop_atr_multiple(self) -> f64 {
        match self {
            Profile::Investor => 2.5,
            Profile::Trader | Profile::Swing => 1.5,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Profile::Investor => "INVESTOR",
            Profile::Trader => "TRADER",
            Profile::Swing => "SWING",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown profile: {0} (expected investor, trader or swing)")]
pub struct UnknownProfile(pub String);

impl FromStr for Profile {
    type Err = UnknownProfile;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "INVESTOR" | "INVEST" => Ok(Profile::Investor),
            "TRADER" => Ok(Profile::Trader),
            "SWING" => Ok(Profile::Swing),
            _ => Err(UnknownProfile(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one() {
        for profile in [Profile::Investor, Profile::Trader, Profile::Swing] {
            let w = profile.weights();
            let sum = w.quality + w.value + w.growth + w.tech;
            assert!((sum - 1.0).abs() < 1e-12, "{profile} weights sum to {sum}");
        }
    }

    #[test]
    fn investor_leans_on_quality() {
        let w = Profile::Investor.weights();
        assert!((w.quality - 0.40).abs() < f64::EPSILON);
        assert!((w.tech - 0.15).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_profile() {
        assert_eq!("investor".parse::<Profile>(), Ok(Profile::Investor));
        assert_eq!(" Swing ".parse::<Profile>(), Ok(Profile::Swing));
        assert!("daytrader".parse::<Profile>().is_err());
    }

    #[test]
    fn stop_multiple_by_profile() {
        assert!((Profile::Investor.stop_atr_multiple() - 2.5).abs() < f64::EPSILON);
        assert!((Profile::Trader.stop_atr_multiple() - 1.5).abs() < f64::EPSILON);
    }
}
