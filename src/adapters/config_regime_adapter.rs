//! Market regime read from configuration.
//!
//! `[regime.<market>]` wins over `[regime]`; with neither the market is
//! neutral with no score impact.

use crate::domain::error::TickerscopeError;
use crate::domain::regime::{MarketRegime, MarketStatus};
use crate::ports::config_port::ConfigPort;
use crate::ports::regime_port::RegimePort;

pub const REGIME_SECTION: &str = "regime";

pub struct ConfigRegimeAdapter<C> {
    config: C,
}

impl<C: ConfigPort> ConfigRegimeAdapter<C> {
    pub fn new(config: C) -> Self {
        Self { config }
    }

    fn section_for(&self, market: &str) -> String {
        let specific = format!("{REGIME_SECTION}.{}", market.trim().to_lowercase());
        if !market.trim().is_empty() && self.config.has_key(&specific, "status") {
            specific
        } else {
            REGIME_SECTION.to_string()
        }
    }
}

impl<C: ConfigPort + Send + Sync> RegimePort for ConfigRegimeAdapter<C> {
    fn market_regime(&self, market: &str) -> Result<MarketRegime, TickerscopeError> {
        let section = self.section_for(market);
        let Some(raw) = self.config.get_string(&section, "status") else {
            return Ok(MarketRegime::neutral());
        };

        let status = raw
            .parse::<MarketStatus>()
            .map_err(|e| TickerscopeError::ConfigInvalid {
                section: section.clone(),
                key: "status".to_string(),
                reason: e.to_string(),
            })?;
        let impact = self.config.get_int(&section, "score_impact", 0);
        let score_impact = i32::try_from(impact).map_err(|_| TickerscopeError::ConfigInvalid {
            section,
            key: "score_impact".to_string(),
            reason: format!("score_impact out of range: {impact}"),
        })?;

        Ok(MarketRegime::new(status, score_impact))
    }
}
