//! Configuration validation.
//!
//! Every section is optional; a key that is present must parse and sit in
//! range. Runs before any command touches data.

use crate::domain::error::TickerscopeError;
use crate::domain::profile::Profile;
use crate::domain::regime::MarketStatus;
use crate::ports::config_port::ConfigPort;

pub const MAX_HORIZON_DAYS: i64 = 3_650;
pub const MAX_PATHS: i64 = 1_000_000;
pub const MAX_CONCURRENCY: i64 = 256;
pub const MAX_SCORE_IMPACT: i64 = 100;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), TickerscopeError> {
    validate_engine(config)?;
    validate_monte_carlo(config)?;
    validate_regime(config, "regime")?;
    validate_batch(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> TickerscopeError {
    TickerscopeError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn parse_int(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<i64>, TickerscopeError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| invalid(section, key, format!("{key} must be an integer, got '{raw}'"))),
    }
}

fn parse_float(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<f64>, TickerscopeError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(invalid(section, key, format!("{key} must be a number, got '{raw}'"))),
        },
    }
}

fn int_in_range(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    min: i64,
    max: i64,
) -> Result<(), TickerscopeError> {
    match parse_int(config, section, key)? {
        Some(v) if v < min || v > max => Err(invalid(
            section,
            key,
            format!("{key} must be between {min} and {max}"),
        )),
        _ => Ok(()),
    }
}

fn validate_engine(config: &dyn ConfigPort) -> Result<(), TickerscopeError> {
    if let Some(raw) = config.get_string("engine", "profile") {
        raw.parse::<Profile>()
            .map_err(|e| invalid("engine", "profile", e.to_string()))?;
    }
    if let Some(capital) = parse_float(config, "engine", "initial_capital")? {
        if capital <= 0.0 {
            return Err(invalid("engine", "initial_capital", "initial_capital must be positive"));
        }
    }
    int_in_range(config, "engine", "warmup_bars", 1, i64::from(u32::MAX))?;
    parse_float(config, "engine", "backtest_cagr")?;
    Ok(())
}

fn validate_monte_carlo(config: &dyn ConfigPort) -> Result<(), TickerscopeError> {
    int_in_range(config, "monte_carlo", "days", 1, MAX_HORIZON_DAYS)?;
    int_in_range(config, "monte_carlo", "paths", 1, MAX_PATHS)?;
    int_in_range(config, "monte_carlo", "seed", 0, i64::MAX)?;
    Ok(())
}

/// Checks `[regime]` or a per-market `[regime.<market>]` section.
pub fn validate_regime(config: &dyn ConfigPort, section: &str) -> Result<(), TickerscopeError> {
    if let Some(raw) = config.get_string(section, "status") {
        raw.parse::<MarketStatus>()
            .map_err(|e| invalid(section, "status", e.to_string()))?;
    }
    int_in_range(config, section, "score_impact", -MAX_SCORE_IMPACT, MAX_SCORE_IMPACT)
}

fn validate_batch(config: &dyn ConfigPort) -> Result<(), TickerscopeError> {
    int_in_range(config, "batch", "concurrency", 1, MAX_CONCURRENCY)?;
    int_in_range(config, "batch", "lookback_days", 1, MAX_HORIZON_DAYS)?;
    int_in_range(config, "batch", "min_bars", 2, i64::from(u32::MAX))?;
    Ok(())
}
