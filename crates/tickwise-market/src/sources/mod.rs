pub mod yahoo;

use async_trait::async_trait;
use tickwise_models::{Fundamentals, PriceSeries, TickerSymbol};

use crate::error::MarketError;

/// An upstream source of daily price history and fundamentals.
///
/// Implementations are treated as unreliable: they may fail, return an empty
/// series, or omit fundamentals fields. Callers go through
/// [`crate::fetcher::RetryingFetcher`] rather than using a provider directly.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Daily bars covering the most recent `sessions` trading sessions.
    /// An empty series is a valid answer; the fetcher decides what it means.
    async fn fetch_history(
        &self,
        ticker: &TickerSymbol,
        sessions: usize,
    ) -> Result<PriceSeries, MarketError>;

    async fn fetch_info(&self, ticker: &TickerSymbol) -> Result<Fundamentals, MarketError>;
}
