//! Signal tools and the fixed registry the model backend sees.
//!
//! A tool takes free text, never fails past its own boundary, and always
//! answers with a single line of text: either the formatted signal or an
//! error description.

mod fundamental;
mod market_data;
mod risk;
mod technical;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tickwise_market::{MarketError, RetryingFetcher};
use tickwise_models::{
    validate_ticker, validate_tool_query, DataConfig, TickerSymbol, ValidationError,
};

use crate::backends::ToolSpec;

pub use fundamental::{format_fundamentals, FundamentalAnalysisTool};
pub use market_data::{format_market_signal, MarketDataTool};
pub use risk::{format_risk_assessment, RiskAssessmentTool};
pub use technical::{format_technical_signal, TechnicalAnalysisTool};

/// The closed set of signal capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    MarketData,
    TechnicalAnalysis,
    FundamentalAnalysis,
    RiskAssessment,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [
        ToolKind::MarketData,
        ToolKind::TechnicalAnalysis,
        ToolKind::FundamentalAnalysis,
        ToolKind::RiskAssessment,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::MarketData => "get_market_data",
            ToolKind::TechnicalAnalysis => "technical_analysis",
            ToolKind::FundamentalAnalysis => "fundamental_analysis",
            ToolKind::RiskAssessment => "risk_assessment",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ToolKind::MarketData => {
                "Get real-time market data for any stock including price, volume, and technical indicators"
            }
            ToolKind::TechnicalAnalysis => {
                "Perform technical analysis on any stock using multiple indicators"
            }
            ToolKind::FundamentalAnalysis => {
                "Analyze fundamental metrics and company performance for any stock"
            }
            ToolKind::RiskAssessment => {
                "Assess investment risk for any stock based on various factors"
            }
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    fn error_prefix(self) -> &'static str {
        match self {
            ToolKind::MarketData => "Error fetching market data",
            ToolKind::TechnicalAnalysis => "Error in technical analysis",
            ToolKind::FundamentalAnalysis => "Error in fundamental analysis",
            ToolKind::RiskAssessment => "Error in risk assessment",
        }
    }

    fn unavailable_message(self, ticker: &str) -> String {
        match self {
            ToolKind::MarketData => {
                format!("Error: Unable to fetch {ticker} market data after multiple attempts")
            }
            ToolKind::TechnicalAnalysis => format!(
                "Error: Unable to fetch data for {ticker} technical analysis after multiple attempts"
            ),
            ToolKind::FundamentalAnalysis => {
                format!("Error: Unable to fetch {ticker} fundamentals after multiple attempts")
            }
            ToolKind::RiskAssessment => format!(
                "Error: Unable to fetch {ticker} data for risk assessment after multiple attempts"
            ),
        }
    }

    /// Render a failure as the text the model will read.
    pub(crate) fn describe_failure(self, ticker: &TickerSymbol, error: &MarketError) -> String {
        match error {
            MarketError::DataUnavailable { .. } => self.unavailable_message(ticker.as_str()),
            MarketError::InsufficientData { required, .. } => format!(
                "Error: Insufficient data for {ticker} - need at least {required} days of trading data"
            ),
            MarketError::Validation(ValidationError::InvalidSignal(reason)) => {
                format!("Error: {reason}")
            }
            MarketError::Validation(other) => format!("Validation error: {other}"),
            other => format!("{}: {other}", self.error_prefix()),
        }
    }
}

/// One signal capability: name, description, input schema and invocation.
#[async_trait]
pub trait SignalTool: Send + Sync {
    fn kind(&self) -> ToolKind;

    fn name(&self) -> &'static str {
        self.kind().name()
    }

    fn description(&self) -> &'static str {
        self.kind().description()
    }

    fn input_schema(&self) -> Value {
        query_input_schema()
    }

    /// Never fails: expected and unexpected faults alike come back as text.
    async fn invoke(&self, input: &str) -> String;
}

/// Every tool takes a single free-text `query`.
pub fn query_input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "Free-text request naming the stock ticker, e.g. \"TSLA\" or \"risk for NVDA\"",
                "minLength": 1,
                "maxLength": tickwise_models::input::MAX_TOOL_QUERY_LEN,
            }
        },
        "required": ["query"]
    })
}

/// Dependencies shared by all four tools. Immutable after construction.
pub struct ToolContext {
    pub fetcher: Arc<RetryingFetcher>,
    pub data: DataConfig,
}

impl ToolContext {
    pub fn new(fetcher: Arc<RetryingFetcher>, data: DataConfig) -> Self {
        Self { fetcher, data }
    }

    /// Validate tool input, pull a ticker out of it and validate that.
    pub fn resolve_ticker(&self, input: &str) -> Result<TickerSymbol, ValidationError> {
        let query = validate_tool_query(input)?;
        let raw = extract_ticker(query.as_str(), &self.data.default_ticker);
        validate_ticker(&raw)
    }
}

/// Common words that look like tickers in a natural-language request.
const QUERY_WORDS: &[&str] = &[
    "A", "ABOUT", "ALL", "AN", "AND", "ANY", "ARE", "AS", "AT", "BE", "BUY", "BY", "CAN", "DATA",
    "DO", "DOES", "FOR", "FROM", "GET", "GIVE", "GOOD", "HOLD", "HOW", "I", "IF", "IN", "INFO",
    "IS", "IT", "ITS", "ME", "MY", "NOW", "OF", "ON", "OR", "OUR", "PLEASE", "PRICE", "RISK",
    "SELL", "SHARE", "SHOW", "STOCK", "THE", "THIS", "TO", "TODAY", "WHAT", "WHEN", "WHY", "WILL",
    "WITH", "YOU",
];

/// Leftmost whitespace token that is alphabetic, at most five letters and
/// not a common query word.
///
/// Query words are still tickers (NOW, ALL, A) when they are the whole
/// query, or when written in capitals and nothing better qualifies. Falls
/// back to `default` otherwise.
pub fn extract_ticker(query: &str, default: &str) -> String {
    let candidates: Vec<&str> = query
        .split_whitespace()
        .map(|token| token.trim_matches(|c: char| c.is_ascii_punctuation()))
        .filter(|token| {
            !token.is_empty()
                && token.len() <= tickwise_models::input::MAX_TICKER_LEN
                && token.chars().all(|c| c.is_ascii_alphabetic())
        })
        .collect();

    let is_query_word = |token: &str| QUERY_WORDS.contains(&token.to_ascii_uppercase().as_str());
    let single_token = query.split_whitespace().count() == 1;

    candidates
        .iter()
        .copied()
        .find(|token| !is_query_word(*token))
        .or_else(|| candidates.first().copied().filter(|_| single_token))
        .or_else(|| {
            candidates
                .iter()
                .copied()
                .find(|token| token.len() > 1 && token.chars().all(|c| c.is_ascii_uppercase()))
        })
        .map(|token| token.to_ascii_uppercase())
        .unwrap_or_else(|| default.to_ascii_uppercase())
}

/// `1234567` -> `"1,234,567"`.
pub fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// A ratio rendered as a percentage with one decimal: `0.071` -> `"7.1%"`.
pub fn percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

/// The tools in the order they are offered to the model.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn SignalTool>>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<Arc<dyn SignalTool>>) -> Self {
        Self { tools }
    }

    pub fn standard(context: Arc<ToolContext>) -> Self {
        Self::new(vec![
            Arc::new(MarketDataTool::new(context.clone())),
            Arc::new(TechnicalAnalysisTool::new(context.clone())),
            Arc::new(FundamentalAnalysisTool::new(context.clone())),
            Arc::new(RiskAssessmentTool::new(context)),
        ])
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn SignalTool>> {
        self.tools.iter().find(|tool| tool.name() == name).cloned()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools
            .iter()
            .map(|tool| ToolSpec {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                input_schema: tool.input_schema(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
