//! Domain error types.
//!
//! Only fatal conditions live here. An indicator that is still warming up,
//! or whose denominator is zero, is not an error: it shows up as an invalid
//! [`IndicatorPoint`](crate::domain::indicator::IndicatorPoint) and the bar
//! is simply skipped by the signal detectors.

/// Top-level error type for pipsim.
#[derive(Debug, thiserror::Error)]
pub enum PipsimError {
    #[error("input error: {reason}")]
    Input { reason: String },

    #[error("empty series: {series}")]
    EmptySeries { series: String },

    #[error("timestamps in {series} are not strictly increasing at row {index}")]
    NonMonotonicTimestamps { series: String, index: usize },

    #[error("invalid {field} price in {series} at row {index}")]
    InvalidPrice {
        series: String,
        index: usize,
        field: &'static str,
    },

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

    #[error("unknown {kind} '{value}'")]
    UnknownOption { kind: &'static str, value: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PipsimError {
    pub fn input(reason: impl Into<String>) -> Self {
        PipsimError::Input {
            reason: reason.into(),
        }
    }

    pub fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        PipsimError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&PipsimError> for std::process::ExitCode {
    fn from(err: &PipsimError) -> Self {
        let code: u8 = match err {
            PipsimError::Io(_) => 1,
            PipsimError::ConfigParse { .. }
            | PipsimError::ConfigMissing { .. }
            | PipsimError::ConfigInvalid { .. }
            | PipsimError::UnknownOption { .. } => 2,
            PipsimError::Input { .. }
            | PipsimError::EmptySeries { .. }
            | PipsimError::NonMonotonicTimestamps { .. }
            | PipsimError::InvalidPrice { .. } => 3,
            PipsimError::Csv(_) => 4,
        };
        std::process::ExitCode::from(code)
    }
}
