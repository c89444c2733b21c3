//! Market data port traits.

use crate::domain::error::TickerscopeError;
use crate::domain::fundamentals::{FinancialStatementSeries, FundamentalSnapshot};
use crate::domain::ohlcv::PriceBar;
use chrono::NaiveDate;

/// Daily price history. Implementations return bars ascending by date with
/// no duplicate dates; an unknown ticker is `Ok(vec![])`, not an error.
pub trait PriceHistoryPort: Send + Sync {
    fn fetch_prices(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, TickerscopeError>;
}

pub trait FundamentalsPort: Send + Sync {
    /// Sparse ratio snapshot; empty when the vendor has nothing.
    fn fetch_snapshot(&self, ticker: &str) -> Result<FundamentalSnapshot, TickerscopeError>;

    /// Statement line items by period; empty when unavailable.
    fn fetch_statements(&self, ticker: &str) -> Result<FinancialStatementSeries, TickerscopeError>;
}
