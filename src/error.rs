//! Error types for the buy-vs-rent engine

use thiserror::Error;

/// Failures reported by the engine.
///
/// Every public computation returns one of these instead of producing
/// NaN/Infinity or panicking, so the caller can show a message and carry on.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid parameter: {field} - {reason}")]
    InvalidParameter { field: String, reason: String },

    #[error("Inconsistent cash-flow series: buy has {buy_len} periods, rent has {rent_len}")]
    InconsistentSeries { buy_len: usize, rent_len: usize },

    #[error("Failed to load parameters: {0}")]
    Load(String),
}

impl EngineError {
    /// Shorthand for an `InvalidParameter` error
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        EngineError::InvalidParameter {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<csv::Error> for EngineError {
    fn from(e: csv::Error) -> Self {
        EngineError::Load(e.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Load(e.to_string())
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Load(e.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
