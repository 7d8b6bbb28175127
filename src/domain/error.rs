//! Domain error types.
//!
//! Two classes of failure exist. Configuration problems (bad windows,
//! negative fees, unparsable files) fail fast before any computation.
//! Degenerate data (empty history, too few points, zero variance) is
//! never an error: the affected statistic returns 0.0 and the signal
//! generator returns all-flat, so those conditions never appear here.

/// Top-level error type for quantbt.
#[derive(Debug, thiserror::Error)]
pub enum QuantbtError {
    #[error("storage error: {reason}")]
    Storage { reason: String },

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

    #[error("unsupported timeframe {value:?}, expected e.g. 5m, 1h, 1d")]
    BadTimeframe { value: String },

    #[error("no data for {symbol} on {exchange}")]
    NoData { symbol: String, exchange: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&QuantbtError> for std::process::ExitCode {
    fn from(err: &QuantbtError) -> Self {
        let code: u8 = match err {
            QuantbtError::Io(_) => 1,
            QuantbtError::ConfigParse { .. }
            | QuantbtError::ConfigMissing { .. }
            | QuantbtError::ConfigInvalid { .. }
            | QuantbtError::BadTimeframe { .. } => 2,
            QuantbtError::Storage { .. } => 3,
            QuantbtError::NoData { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
