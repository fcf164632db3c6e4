//! Domain error types.

/// Top-level error type for nisasim.
#[derive(Debug, thiserror::Error)]
pub enum NisaError {
    #[error("invalid contribution plan: {reason}")]
    InvalidPlan { reason: String },

    #[error("invalid investment cap: {reason}")]
    InvalidCap { reason: String },

    #[error("invalid growth rate: {reason}")]
    InvalidRate { reason: String },

    #[error("invalid risk configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("insufficient price data: have {points} points, need {minimum}")]
    InsufficientData { points: usize, minimum: usize },

    #[error("invalid price {price} on {date}")]
    InvalidPrice { date: String, price: f64 },

    #[error("no price data for {symbol}")]
    NoData { symbol: String },

    #[error("malformed price data in {source_name}: {reason}")]
    MalformedData { source_name: String, reason: String },

    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("serialization error: {reason}")]
    Serialization { reason: String },

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

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for NisaError {
    fn from(err: serde_json::Error) -> Self {
        NisaError::Serialization {
            reason: err.to_string(),
        }
    }
}

impl From<&NisaError> for std::process::ExitCode {
    fn from(err: &NisaError) -> Self {
        let code: u8 = match err {
            NisaError::Io(_) => 1,
            NisaError::ConfigParse { .. }
            | NisaError::ConfigMissing { .. }
            | NisaError::ConfigInvalid { .. } => 2,
            NisaError::Database { .. }
            | NisaError::DatabaseQuery { .. }
            | NisaError::Serialization { .. } => 3,
            NisaError::InvalidPlan { .. }
            | NisaError::InvalidCap { .. }
            | NisaError::InvalidRate { .. }
            | NisaError::InvalidConfig { .. } => 4,
            NisaError::InsufficientData { .. }
            | NisaError::InvalidPrice { .. }
            | NisaError::NoData { .. }
            | NisaError::MalformedData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
