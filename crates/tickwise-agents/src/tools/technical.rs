use std::sync::Arc;

use async_trait::async_trait;
use tickwise_market::{signals, MarketError};
use tickwise_models::{TechnicalSignal, TickerSymbol};

use super::{SignalTool, ToolContext, ToolKind};

/// RSI zone, moving-average trend, MACD and Bollinger position.
pub struct TechnicalAnalysisTool {
    context: Arc<ToolContext>,
}

impl TechnicalAnalysisTool {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }

    async fn analyze(&self, ticker: &TickerSymbol) -> Result<TechnicalSignal, MarketError> {
        let series = self
            .context
            .fetcher
            .fetch_history(ticker, self.context.data.history_sessions)
            .await?;
        signals::technical_signal(&series)
    }
}

pub fn format_technical_signal(signal: &TechnicalSignal) -> String {
    format!(
        "{} Technical Analysis: RSI={:.1} ({}), MA Signal={}, MACD={}, Bollinger Band Position={}",
        signal.ticker,
        signal.rsi,
        signal.rsi_zone,
        signal.ma_trend,
        signal.macd_trend,
        signal.band_position,
    )
}

#[async_trait]
impl SignalTool for TechnicalAnalysisTool {
    fn kind(&self) -> ToolKind {
        ToolKind::TechnicalAnalysis
    }

    async fn invoke(&self, input: &str) -> String {
        let ticker = match self.context.resolve_ticker(input) {
            Ok(ticker) => ticker,
            Err(e) => return format!("Validation error: {e}"),
        };
        tracing::info!(tool = self.name(), %ticker, "Invoking tool");

        match self.analyze(&ticker).await {
            Ok(signal) => format_technical_signal(&signal),
            Err(e) => {
                tracing::warn!(tool = self.name(), %ticker, error = %e, "Technical analysis failed");
                self.kind().describe_failure(&ticker, &e)
            }
        }
    }
}
