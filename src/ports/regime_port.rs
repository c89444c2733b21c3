//! Broad-market regime port trait.

use crate::domain::error::TickerscopeError;
use crate::domain::regime::MarketRegime;

pub trait RegimePort: Send + Sync {
    /// Regime for `market` (e.g. an index or exchange name).
    fn market_regime(&self, market: &str) -> Result<MarketRegime, TickerscopeError>;
}
