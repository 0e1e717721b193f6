pub mod config;
pub mod error;
pub mod input;
pub mod report;
pub mod series;
pub mod signal;

pub use config::{CredentialsConfig, DataConfig, LlmConfig, ProviderKind, ReportConfig, TickwiseConfig};
pub use error::ValidationError;
pub use input::{
    validate_query, validate_ticker, validate_tool_query, AnalysisQuery, TickerSymbol, ToolQuery,
};
pub use report::{AnalysisReport, Confidence, MarketSnapshot, Recommendation};
pub use series::{Fundamentals, PriceBar, PriceSeries};
pub use signal::{
    validate_market_signal, validate_risk_assessment, validate_technical_signal, BandPosition,
    BetaSource, MarketSignal, MarketSignalFields, RiskAssessment, RiskFactor, RiskLevel, RsiZone,
    TechnicalSignal, Trend,
};
