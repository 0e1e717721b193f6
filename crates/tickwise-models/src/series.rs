use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::input::TickerSymbol;

/// One daily OHLCV sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    pub fn session(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Finite and positive.
    pub fn has_usable_close(&self) -> bool {
        self.close.is_finite() && self.close > 0.0
    }
}

/// Ordered price history for one symbol over a trailing window.
///
/// Immutable once built: bars are sorted oldest-first on construction and
/// only exposed by shared reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: TickerSymbol,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(symbol: TickerSymbol, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|bar| bar.timestamp);
        Self { symbol, bars }
    }

    pub fn symbol(&self) -> &TickerSymbol {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn latest(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Most recent bar whose close survives [`PriceSeries::closes`].
    pub fn latest_usable(&self) -> Option<&PriceBar> {
        self.bars.iter().rev().find(|bar| bar.has_usable_close())
    }

    /// Closing prices, oldest first, skipping samples that are not usable
    /// (non-finite or non-positive).
    pub fn closes(&self) -> Vec<f64> {
        self.bars
            .iter()
            .filter(|bar| bar.has_usable_close())
            .map(|bar| bar.close)
            .collect()
    }

    /// (session, close) pairs for aligning two series on trading date.
    pub fn dated_closes(&self) -> Vec<(NaiveDate, f64)> {
        self.bars
            .iter()
            .filter(|bar| bar.has_usable_close())
            .map(|bar| (bar.session(), bar.close))
            .collect()
    }

    /// Keep only the most recent `sessions` bars.
    pub fn tail(self, sessions: usize) -> Self {
        let skip = self.bars.len().saturating_sub(sessions);
        Self {
            symbol: self.symbol,
            bars: self.bars.into_iter().skip(skip).collect(),
        }
    }
}

/// Key/value fundamentals as reported upstream. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub market_cap: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub price_to_book: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub profit_margins: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub return_on_equity: Option<f64>,
}

impl Fundamentals {
    /// Missing or non-finite values default to 0.
    pub fn value_or_zero(value: Option<f64>) -> f64 {
        value.filter(|v| v.is_finite()).unwrap_or(0.0)
    }

    /// Display names of the fields the fundamental analysis reads that were
    /// absent upstream.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("Market Cap", self.market_cap),
            ("P/E", self.trailing_pe),
            ("Debt/Equity", self.debt_to_equity),
            ("Profit Margin", self.profit_margins),
            ("Revenue Growth", self.revenue_growth),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_some_and(f64::is_finite))
        .map(|(name, _)| name)
        .collect()
    }
}
