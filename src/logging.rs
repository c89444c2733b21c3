//! Logging configuration and initialization.
//!
//! Diagnostics go to stderr so that stdout carries only command output.

use std::env;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line, human-readable output
    Pretty,
    /// Single-line output
    #[default]
    Compact,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Compact,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is unset.
    pub default_level: String,
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Compact,
            default_level: "warn".to_string(),
            include_target: false,
        }
    }
}

impl LogConfig {
    /// Reads `LOG_FORMAT` (pretty | compact) and `LOG_LEVEL`.
    /// `RUST_LOG`, when set, takes precedence over `LOG_LEVEL` at init.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            format: lookup("LOG_FORMAT")
                .map(|s| LogFormat::parse(&s))
                .unwrap_or(defaults.format),
            default_level: lookup("LOG_LEVEL").unwrap_or(defaults.default_level),
            include_target: lookup("LOG_TARGET")
                .map(|s| s == "true" || s == "1")
                .unwrap_or(defaults.include_target),
        }
    }

    pub fn with_default_level(mut self, level: impl Into<String>) -> Self {
        self.default_level = level.into();
        self
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber is already set.
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_level));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.include_target);

    match config.format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(layer.pretty())
            .try_init()?,
        LogFormat::Compact => tracing_subscriber::registry()
            .with(env_filter)
            .with(layer.compact())
            .try_init()?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn format_parse() {
        assert_eq!(LogFormat::parse("PRETTY"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::parse("json"), LogFormat::Compact);
    }

    #[test]
    fn defaults_without_env() {
        assert_eq!(LogConfig::from_lookup(lookup(&[])), LogConfig::default());
    }

    #[test]
    fn reads_env_values() {
        let config = LogConfig::from_lookup(lookup(&[
            ("LOG_FORMAT", "pretty"),
            ("LOG_LEVEL", "tickerscope=debug"),
            ("LOG_TARGET", "1"),
        ]));
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.default_level, "tickerscope=debug");
        assert!(config.include_target);
    }
}
