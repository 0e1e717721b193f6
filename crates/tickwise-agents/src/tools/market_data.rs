use std::sync::Arc;

use async_trait::async_trait;
use tickwise_market::{signals, MarketError};
use tickwise_models::{MarketSignal, TickerSymbol};

use super::{thousands, SignalTool, ToolContext, ToolKind};

/// Price, change, volume, RSI and the two moving averages.
pub struct MarketDataTool {
    context: Arc<ToolContext>,
}

impl MarketDataTool {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }

    /// Fetch and validate the signal for an already-validated ticker.
    pub async fn fetch_signal(&self, ticker: &TickerSymbol) -> Result<MarketSignal, MarketError> {
        let series = self
            .context
            .fetcher
            .fetch_history(ticker, self.context.data.history_sessions)
            .await?;
        signals::market_signal(&series)
    }

    /// Same text `invoke` produces, for a ticker the caller already holds.
    pub async fn describe(&self, ticker: &TickerSymbol) -> (Option<MarketSignal>, String) {
        match self.fetch_signal(ticker).await {
            Ok(signal) => {
                let text = format_market_signal(&signal);
                (Some(signal), text)
            }
            Err(e) => {
                tracing::warn!(tool = self.name(), %ticker, error = %e, "Market data unavailable");
                (None, self.kind().describe_failure(ticker, &e))
            }
        }
    }
}

pub fn format_market_signal(signal: &MarketSignal) -> String {
    format!(
        "{} Market Data: Price=${:.2}, Change={:.2}%, Volume={}, RSI={:.1}, 20SMA=${:.2}, 50SMA=${:.2}",
        signal.ticker(),
        signal.price(),
        signal.change_percent(),
        thousands(signal.volume()),
        signal.rsi(),
        signal.sma_20(),
        signal.sma_50(),
    )
}

#[async_trait]
impl SignalTool for MarketDataTool {
    fn kind(&self) -> ToolKind {
        ToolKind::MarketData
    }

    async fn invoke(&self, input: &str) -> String {
        let ticker = match self.context.resolve_ticker(input) {
            Ok(ticker) => ticker,
            Err(e) => return format!("Validation error: {e}"),
        };
        tracing::info!(tool = self.name(), %ticker, "Invoking tool");
        self.describe(&ticker).await.1
    }
}
