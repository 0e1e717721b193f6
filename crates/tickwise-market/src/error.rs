use thiserror::Error;
use tickwise_models::ValidationError;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("No data returned for {ticker} after {attempts} attempts")]
    DataUnavailable { ticker: String, attempts: u32 },

    /// Upstream answered but with no samples. Retryable.
    #[error("Empty response for {0}")]
    EmptyResult(String),

    #[error("Insufficient data for {ticker} - need at least {required} sessions, got {available}")]
    InsufficientData {
        ticker: String,
        required: usize,
        available: usize,
    },

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl MarketError {
    pub fn is_empty_result(&self) -> bool {
        matches!(self, MarketError::EmptyResult(_))
    }
}
