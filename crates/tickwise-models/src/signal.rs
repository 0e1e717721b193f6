use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::input::TickerSymbol;

/// Raw computed values, before the output schema has seen them.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSignalFields {
    pub ticker: TickerSymbol,
    pub price: f64,
    pub change_percent: f64,
    pub volume: u64,
    pub rsi: f64,
    pub sma_20: f64,
    pub sma_50: f64,
}

/// Validated market snapshot returned by the market data tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSignal {
    ticker: TickerSymbol,
    price: f64,
    change_percent: f64,
    volume: u64,
    rsi: f64,
    sma_20: f64,
    sma_50: f64,
}

impl MarketSignal {
    pub fn ticker(&self) -> &TickerSymbol {
        &self.ticker
    }
    pub fn price(&self) -> f64 {
        self.price
    }
    pub fn change_percent(&self) -> f64 {
        self.change_percent
    }
    pub fn volume(&self) -> u64 {
        self.volume
    }
    pub fn rsi(&self) -> f64 {
        self.rsi
    }
    pub fn sma_20(&self) -> f64 {
        self.sma_20
    }
    pub fn sma_50(&self) -> f64 {
        self.sma_50
    }
}

/// Last line of defense between the indicator engine and a caller.
///
/// Comparisons are written so that NaN fails every bound.
pub fn validate_market_signal(fields: MarketSignalFields) -> Result<MarketSignal, ValidationError> {
    let ticker = &fields.ticker;
    if !(fields.price > 0.0) || !fields.price.is_finite() {
        return Err(ValidationError::InvalidSignal(format!(
            "Invalid price data for {ticker} - price must be positive"
        )));
    }
    if fields.volume == 0 {
        return Err(ValidationError::InvalidSignal(format!(
            "Invalid volume data for {ticker} - volume must be positive"
        )));
    }
    if !(0.0..=100.0).contains(&fields.rsi) {
        return Err(ValidationError::InvalidSignal(format!(
            "Invalid RSI value for {ticker} - RSI must be between 0 and 100"
        )));
    }
    if !(fields.sma_20 > 0.0 && fields.sma_50 > 0.0)
        || !fields.sma_20.is_finite()
        || !fields.sma_50.is_finite()
    {
        return Err(ValidationError::InvalidSignal(format!(
            "Invalid moving average data for {ticker} - SMAs must be positive"
        )));
    }
    if !fields.change_percent.is_finite() {
        return Err(ValidationError::InvalidSignal(format!(
            "Invalid price change for {ticker} - change must be a finite number"
        )));
    }

    Ok(MarketSignal {
        ticker: fields.ticker,
        price: fields.price,
        change_percent: fields.change_percent,
        volume: fields.volume,
        rsi: fields.rsi,
        sma_20: fields.sma_20,
        sma_50: fields.sma_50,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

impl RsiZone {
    pub fn classify(rsi: f64) -> Self {
        if rsi > 70.0 {
            RsiZone::Overbought
        } else if rsi < 30.0 {
            RsiZone::Oversold
        } else {
            RsiZone::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

impl Trend {
    /// Stacked moving averages: price > SMA20 > SMA50 is bullish and the
    /// mirror image bearish.
    pub fn from_moving_averages(price: f64, sma_20: f64, sma_50: f64) -> Self {
        if price > sma_20 && sma_20 > sma_50 {
            Trend::Bullish
        } else if price < sma_20 && sma_20 < sma_50 {
            Trend::Bearish
        } else {
            Trend::Neutral
        }
    }

    /// MACD has no neutral band.
    pub fn from_macd(macd: f64, signal: f64) -> Self {
        if macd > signal {
            Trend::Bullish
        } else {
            Trend::Bearish
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandPosition {
    Upper,
    Lower,
    Middle,
}

impl BandPosition {
    pub fn classify(price: f64, upper: f64, lower: f64) -> Self {
        if price > upper {
            BandPosition::Upper
        } else if price < lower {
            BandPosition::Lower
        } else {
            BandPosition::Middle
        }
    }
}

impl fmt::Display for RsiZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RsiZone::Overbought => "Overbought",
            RsiZone::Oversold => "Oversold",
            RsiZone::Neutral => "Neutral",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Trend::Bullish => "Bullish",
            Trend::Bearish => "Bearish",
            Trend::Neutral => "Neutral",
        };
        f.write_str(s)
    }
}

impl fmt::Display for BandPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BandPosition::Upper => "Upper Band",
            BandPosition::Lower => "Lower Band",
            BandPosition::Middle => "Middle",
        };
        f.write_str(s)
    }
}

/// Output of the technical analysis tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSignal {
    pub ticker: TickerSymbol,
    pub rsi: f64,
    pub rsi_zone: RsiZone,
    pub ma_trend: Trend,
    pub macd_trend: Trend,
    pub band_position: BandPosition,
}

pub fn validate_technical_signal(signal: &TechnicalSignal) -> Result<(), ValidationError> {
    if !(0.0..=100.0).contains(&signal.rsi) {
        return Err(ValidationError::InvalidSignal(format!(
            "Invalid RSI value for {} - RSI must be between 0 and 100",
            signal.ticker
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u32) -> Self {
        if score > 4 {
            RiskLevel::High
        } else if score > 2 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "Low" => Some(RiskLevel::Low),
            "Medium" => Some(RiskLevel::Medium),
            "High" => Some(RiskLevel::High),
            _ => None,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskFactor {
    HighVolatility,
    ModerateVolatility,
    HighBeta,
    ElevatedBeta,
    HighDebt,
    ModerateDebt,
    NegativeMargins,
}

impl fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskFactor::HighVolatility => "High volatility",
            RiskFactor::ModerateVolatility => "Moderate volatility",
            RiskFactor::HighBeta => "High beta",
            RiskFactor::ElevatedBeta => "Elevated beta",
            RiskFactor::HighDebt => "High debt levels",
            RiskFactor::ModerateDebt => "Moderate debt",
            RiskFactor::NegativeMargins => "Negative profit margins",
        };
        f.write_str(s)
    }
}

/// Where the beta figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetaSource {
    Benchmark,
    /// Benchmark unavailable; the fixed neutral value was substituted.
    NeutralDefault,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub ticker: TickerSymbol,
    pub volatility: f64,
    pub beta: f64,
    pub beta_source: BetaSource,
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub factors: Vec<RiskFactor>,
}

pub fn validate_risk_assessment(assessment: &RiskAssessment) -> Result<(), ValidationError> {
    if !(assessment.volatility >= 0.0) || !assessment.volatility.is_finite() {
        return Err(ValidationError::InvalidSignal(format!(
            "Invalid volatility for {} - volatility must be a non-negative number",
            assessment.ticker
        )));
    }
    if !assessment.beta.is_finite() {
        return Err(ValidationError::InvalidSignal(format!(
            "Invalid beta for {} - beta must be a finite number",
            assessment.ticker
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::validate_ticker;

    fn fields() -> MarketSignalFields {
        MarketSignalFields {
            ticker: validate_ticker("TSLA").unwrap(),
            price: 250.0,
            change_percent: 2.04,
            volume: 1_000_000,
            rsi: 55.0,
            sma_20: 240.0,
            sma_50: 230.0,
        }
    }

    #[test]
    fn valid_signal_passes() {
        let signal = validate_market_signal(fields()).unwrap();
        assert_eq!(signal.price(), 250.0);
        assert_eq!(signal.volume(), 1_000_000);
        assert_eq!(signal.ticker().as_str(), "TSLA");
    }

    #[test]
    fn negative_change_is_allowed() {
        let signal = validate_market_signal(MarketSignalFields {
            change_percent: -7.5,
            ..fields()
        });
        assert!(signal.is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let cases = [
            MarketSignalFields { price: 0.0, ..fields() },
            MarketSignalFields { price: f64::NAN, ..fields() },
            MarketSignalFields { volume: 0, ..fields() },
            MarketSignalFields { rsi: 100.5, ..fields() },
            MarketSignalFields { rsi: -0.1, ..fields() },
            MarketSignalFields { rsi: f64::NAN, ..fields() },
            MarketSignalFields { sma_20: 0.0, ..fields() },
            MarketSignalFields { sma_50: -1.0, ..fields() },
            MarketSignalFields { sma_50: f64::NAN, ..fields() },
            MarketSignalFields { change_percent: f64::INFINITY, ..fields() },
        ];
        for case in cases {
            assert!(
                matches!(
                    validate_market_signal(case.clone()),
                    Err(ValidationError::InvalidSignal(_))
                ),
                "accepted {case:?}"
            );
        }
    }

    #[test]
    fn rsi_bounds_are_inclusive() {
        assert!(validate_market_signal(MarketSignalFields { rsi: 0.0, ..fields() }).is_ok());
        assert!(validate_market_signal(MarketSignalFields { rsi: 100.0, ..fields() }).is_ok());
    }

    #[test]
    fn moving_average_trend() {
        assert_eq!(Trend::from_moving_averages(250.0, 240.0, 230.0), Trend::Bullish);
        assert_eq!(Trend::from_moving_averages(220.0, 230.0, 240.0), Trend::Bearish);
        assert_eq!(Trend::from_moving_averages(235.0, 240.0, 230.0), Trend::Neutral);
    }

    #[test]
    fn macd_has_no_neutral_band() {
        assert_eq!(Trend::from_macd(1.0, 0.5), Trend::Bullish);
        assert_eq!(Trend::from_macd(0.5, 0.5), Trend::Bearish);
    }

    #[test]
    fn labels_render_like_the_report() {
        assert_eq!(BandPosition::Upper.to_string(), "Upper Band");
        assert_eq!(RsiZone::classify(75.0).to_string(), "Overbought");
        assert_eq!(RsiZone::classify(25.0), RsiZone::Oversold);
        assert_eq!(RsiZone::classify(70.0), RsiZone::Neutral);
        assert_eq!(RiskFactor::HighDebt.to_string(), "High debt levels");
    }

    #[test]
    fn risk_level_thresholds() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(2), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(3), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(4), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(5), RiskLevel::High);
        assert_eq!(RiskLevel::parse("High"), Some(RiskLevel::High));
        assert_eq!(RiskLevel::parse("Extreme"), None);
    }

    #[test]
    fn risk_assessment_rejects_nan() {
        let assessment = RiskAssessment {
            ticker: validate_ticker("TSLA").unwrap(),
            volatility: f64::NAN,
            beta: 1.5,
            beta_source: BetaSource::NeutralDefault,
            risk_score: 2,
            risk_level: RiskLevel::Low,
            factors: vec![],
        };
        assert!(validate_risk_assessment(&assessment).is_err());
        let ok = RiskAssessment {
            volatility: 0.42,
            ..assessment
        };
        assert!(validate_risk_assessment(&ok).is_ok());
    }
}
