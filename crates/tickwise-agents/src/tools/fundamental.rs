use std::sync::Arc;

use async_trait::async_trait;
use tickwise_models::{Fundamentals, TickerSymbol};

use super::{percent, SignalTool, ToolContext, ToolKind};

/// Valuation, leverage, margin and growth read from upstream fundamentals.
pub struct FundamentalAnalysisTool {
    context: Arc<ToolContext>,
}

impl FundamentalAnalysisTool {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }
}

fn pe_label(pe: f64) -> &'static str {
    if pe > 50.0 {
        "High"
    } else if pe > 20.0 {
        "Reasonable"
    } else {
        "Low"
    }
}

fn debt_label(debt_to_equity: f64) -> &'static str {
    if debt_to_equity > 1.0 {
        "High"
    } else {
        "Manageable"
    }
}

fn margin_label(margin: f64) -> &'static str {
    if margin > 0.1 {
        "Strong"
    } else if margin < 0.0 {
        "Weak"
    } else {
        "Moderate"
    }
}

fn growth_label(growth: f64) -> &'static str {
    if growth > 0.2 {
        "Strong"
    } else if growth > 0.1 {
        "Moderate"
    } else {
        "Weak"
    }
}

/// Missing values are shown as 0 and listed in a trailing note.
pub fn format_fundamentals(ticker: &TickerSymbol, info: &Fundamentals) -> String {
    let market_cap = Fundamentals::value_or_zero(info.market_cap);
    let pe = Fundamentals::value_or_zero(info.trailing_pe);
    let debt = Fundamentals::value_or_zero(info.debt_to_equity);
    let margin = Fundamentals::value_or_zero(info.profit_margins);
    let growth = Fundamentals::value_or_zero(info.revenue_growth);

    let mut text = format!(
        "{ticker} Fundamental Analysis: Market Cap=${:.1}B, P/E={pe:.1} ({}), Debt/Equity={debt:.2} ({}), Profit Margin={} ({}), Revenue Growth={} ({})",
        market_cap / 1e9,
        pe_label(pe),
        debt_label(debt),
        percent(margin),
        margin_label(margin),
        percent(growth),
        growth_label(growth),
    );

    let missing = info.missing_fields();
    if !missing.is_empty() {
        text.push_str(&format!(
            " (Note: unavailable upstream, defaulted to 0: {})",
            missing.join(", ")
        ));
    }
    text
}

#[async_trait]
impl SignalTool for FundamentalAnalysisTool {
    fn kind(&self) -> ToolKind {
        ToolKind::FundamentalAnalysis
    }

    async fn invoke(&self, input: &str) -> String {
        let ticker = match self.context.resolve_ticker(input) {
            Ok(ticker) => ticker,
            Err(e) => return format!("Validation error: {e}"),
        };
        tracing::info!(tool = self.name(), %ticker, "Invoking tool");

        match self.context.fetcher.fetch_info(&ticker).await {
            Ok(info) => {
                let missing = info.missing_fields();
                if !missing.is_empty() {
                    tracing::warn!(%ticker, ?missing, "Fundamentals incomplete, defaulting to 0");
                }
                format_fundamentals(&ticker, &info)
            }
            Err(e) => {
                tracing::warn!(tool = self.name(), %ticker, error = %e, "Fundamental analysis failed");
                self.kind().describe_failure(&ticker, &e)
            }
        }
    }
}
