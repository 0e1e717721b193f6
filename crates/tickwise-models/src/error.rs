use thiserror::Error;

/// Rejections raised by the validation schemas.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid ticker: {0}")]
    InvalidTicker(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid signal: {0}")]
    InvalidSignal(String),
}
