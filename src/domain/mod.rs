//! Core domain types and analysis operations.

pub mod ohlcv;
pub mod indicator;
pub mod frame;
pub mod fundamentals;
pub mod roce;
pub mod regime;
pub mod profile;
pub mod factors;
pub mod archetype;
pub mod narrative;
pub mod decision;
pub mod metrics;
pub mod backtest;
pub mod monte_carlo;
pub mod diversity;
pub mod performance;
pub mod quant_dna;
pub mod patterns;
pub mod screener;
pub mod config_validation;
pub mod error;
