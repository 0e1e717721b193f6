use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Longest symbol accepted by the ticker schema.
pub const MAX_TICKER_LEN: usize = 5;
/// Bound on the caller-supplied analysis query.
pub const MAX_ANALYSIS_QUERY_LEN: usize = 500;
/// Bound on the free text handed to a signal tool.
pub const MAX_TOOL_QUERY_LEN: usize = 200;

/// A validated, upper-cased equity symbol (1-5 ASCII letters).
///
/// The only way to obtain one is through [`validate_ticker`] (or serde, which
/// routes through the same check), so any symbol that reaches the fetcher or
/// the indicator engine has already passed the schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TickerSymbol(String);

impl TickerSymbol {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TickerSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TickerSymbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_ticker(&value)
    }
}

impl From<TickerSymbol> for String {
    fn from(value: TickerSymbol) -> Self {
        value.0
    }
}

/// Validate and normalize a raw ticker.
pub fn validate_ticker(raw: &str) -> Result<TickerSymbol, ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::InvalidTicker(
            "Ticker cannot be empty".to_string(),
        ));
    }
    if !raw.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidTicker(format!(
            "Ticker must contain only letters (got '{raw}')"
        )));
    }
    if raw.len() > MAX_TICKER_LEN {
        return Err(ValidationError::InvalidTicker(format!(
            "Ticker must be {MAX_TICKER_LEN} characters or less (got '{raw}')"
        )));
    }
    Ok(TickerSymbol(raw.to_ascii_uppercase()))
}

/// Optional free text narrowing the scope of an analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisQuery(String);

impl AnalysisQuery {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnalysisQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validate a caller-supplied analysis query (at most 500 characters).
pub fn validate_query(raw: &str) -> Result<AnalysisQuery, ValidationError> {
    bounded_text(raw, MAX_ANALYSIS_QUERY_LEN).map(AnalysisQuery)
}

/// Free text passed to a signal tool by the model backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolQuery(String);

impl ToolQuery {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validate tool input text (at most 200 characters).
pub fn validate_tool_query(raw: &str) -> Result<ToolQuery, ValidationError> {
    bounded_text(raw, MAX_TOOL_QUERY_LEN).map(ToolQuery)
}

/// Over-long text is rejected outright; truncation is the caller's job.
fn bounded_text(raw: &str, max_len: usize) -> Result<String, ValidationError> {
    let len = raw.chars().count();
    if len > max_len {
        return Err(ValidationError::InvalidQuery(format!(
            "Query must be at most {max_len} characters (got {len})"
        )));
    }
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidQuery(
            "Query cannot be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticker_is_uppercased() {
        assert_eq!(validate_ticker("tsla").unwrap().as_str(), "TSLA");
        assert_eq!(validate_ticker("f").unwrap().as_str(), "F");
        assert_eq!(validate_ticker("GOOGL").unwrap().as_str(), "GOOGL");
    }

    #[test]
    fn ticker_validation_is_idempotent() {
        for raw in ["aapl", "Msft", "nvda", "x", "brkab"] {
            let once = validate_ticker(raw).unwrap();
            let twice = validate_ticker(once.as_str()).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn ticker_rejects_digits_length_and_empty() {
        assert!(matches!(
            validate_ticker("tsla123"),
            Err(ValidationError::InvalidTicker(_))
        ));
        assert!(validate_ticker("ABCDEF").is_err());
        assert!(validate_ticker("").is_err());
        assert!(validate_ticker("BRK.B").is_err());
        assert!(validate_ticker(" TSLA").is_err());
    }

    #[test]
    fn ticker_deserializes_through_schema() {
        let ok: TickerSymbol = serde_json::from_str("\"amd\"").unwrap();
        assert_eq!(ok.as_str(), "AMD");
        assert!(serde_json::from_str::<TickerSymbol>("\"12\"").is_err());
    }

    #[test]
    fn query_is_trimmed() {
        let query = validate_query("  focus on margins ").unwrap();
        assert_eq!(query.as_str(), "focus on margins");
    }

    #[test]
    fn query_rejects_blank_and_overlong() {
        assert!(validate_query("   ").is_err());
        assert!(validate_query(&"a".repeat(MAX_ANALYSIS_QUERY_LEN)).is_ok());
        assert!(validate_query(&"a".repeat(MAX_ANALYSIS_QUERY_LEN + 1)).is_err());
    }

    #[test]
    fn tool_query_uses_shorter_bound() {
        assert!(validate_tool_query(&"a".repeat(MAX_TOOL_QUERY_LEN)).is_ok());
        assert!(matches!(
            validate_tool_query(&"a".repeat(MAX_TOOL_QUERY_LEN + 1)),
            Err(ValidationError::InvalidQuery(_))
        ));
    }
}
