//! Domain error types.

/// Top-level error type for tickerscope.
///
/// Only ports and adapters produce these; the analysis operations degrade to
/// neutral results instead of failing.
#[derive(Debug, thiserror::Error)]
pub enum TickerscopeError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("no data for {ticker}")]
    NoData { ticker: String },

    #[error("insufficient data for {ticker}: have {bars} bars, need {minimum}")]
    InsufficientData {
        ticker: String,
        bars: usize,
        minimum: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TickerscopeError> for std::process::ExitCode {
    fn from(err: &TickerscopeError) -> Self {
        let code: u8 = match err {
            TickerscopeError::Io(_) => 1,
            TickerscopeError::ConfigParse { .. }
            | TickerscopeError::ConfigMissing { .. }
            | TickerscopeError::ConfigInvalid { .. } => 2,
            TickerscopeError::DataSource { .. } => 3,
            TickerscopeError::NoData { .. } | TickerscopeError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
