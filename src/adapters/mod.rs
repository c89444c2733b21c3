//! Concrete adapter implementations for ports.

pub mod config_regime_adapter;
pub mod csv_adapter;
pub mod file_config_adapter;
pub mod fundamentals_adapter;
