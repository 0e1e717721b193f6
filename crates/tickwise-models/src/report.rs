use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::input::TickerSymbol;
use crate::signal::RiskLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Recommendation::Buy => "BUY",
            Recommendation::Sell => "SELL",
            Recommendation::Hold => "HOLD",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
        };
        f.write_str(s)
    }
}

/// Price fields lifted from the market data tool for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub price: f64,
    pub change_percent: f64,
    pub volume: u64,
}

/// The structured recommendation handed back to a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub run_id: Uuid,
    pub ticker: TickerSymbol,
    /// None when the market data tool failed; `market_data` then carries the
    /// error text.
    pub market: Option<MarketSnapshot>,
    pub market_data: String,
    pub recommendation: Recommendation,
    pub confidence: Confidence,
    pub risk_level: RiskLevel,
    /// False when no risk assessment ran and `risk_level` is the default.
    pub risk_level_assessed: bool,
    /// Model answer, truncated to the display bound.
    pub reasoning: String,
    pub provider: String,
    pub model: String,
    pub tools_invoked: Vec<String>,
    pub completed_at: DateTime<Utc>,
    pub processing_time_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::validate_ticker;

    #[test]
    fn recommendation_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Recommendation::Buy).unwrap(), "\"BUY\"");
        assert_eq!(Recommendation::Hold.to_string(), "HOLD");
    }

    #[test]
    fn roundtrip_report() {
        let report = AnalysisReport {
            run_id: Uuid::new_v4(),
            ticker: validate_ticker("NVDA").unwrap(),
            market: Some(MarketSnapshot {
                price: 120.5,
                change_percent: -1.25,
                volume: 42_000_000,
            }),
            market_data: "NVDA Market Data: Price=$120.50".to_string(),
            recommendation: Recommendation::Hold,
            confidence: Confidence::Medium,
            risk_level: RiskLevel::Medium,
            risk_level_assessed: false,
            reasoning: "Mixed signals".to_string(),
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-0".to_string(),
            tools_invoked: vec!["technical_analysis".to_string()],
            completed_at: Utc::now(),
            processing_time_ms: 1200,
        };

        let json = serde_json::to_string(&report).unwrap();
        let back: AnalysisReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report, back);
    }
}
