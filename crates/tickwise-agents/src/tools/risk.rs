use std::sync::Arc;

use async_trait::async_trait;
use tickwise_market::{signals, MarketError};
use tickwise_models::{validate_ticker, BetaSource, Fundamentals, RiskAssessment, TickerSymbol};

use super::{percent, SignalTool, ToolContext, ToolKind};

/// Volatility, beta against the benchmark, leverage and margins folded
/// into one additive score.
pub struct RiskAssessmentTool {
    context: Arc<ToolContext>,
}

/// Which inputs fell back to defaults.
#[derive(Debug, Default)]
struct Degraded {
    fundamentals_missing: Vec<&'static str>,
}

impl RiskAssessmentTool {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }

    async fn analyze(
        &self,
        ticker: &TickerSymbol,
    ) -> Result<(RiskAssessment, Degraded), MarketError> {
        let data = &self.context.data;
        let fetcher = &self.context.fetcher;

        let series = fetcher.fetch_history(ticker, data.history_sessions).await?;

        let info = match fetcher.fetch_info(ticker).await {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!(%ticker, error = %e, "Fundamentals unavailable, risk uses defaults");
                Fundamentals::default()
            }
        };
        let fundamentals_missing = [
            ("Debt/Equity", info.debt_to_equity),
            ("Profit Margin", info.profit_margins),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_some_and(f64::is_finite))
        .map(|(name, _)| name)
        .collect();

        let benchmark = match validate_ticker(&data.benchmark) {
            Ok(symbol) => match fetcher.fetch_benchmark(&symbol, data.benchmark_sessions).await {
                Ok(series) => Some(series),
                Err(e) => {
                    tracing::warn!(benchmark = %symbol, error = %e, "Benchmark fetch failed");
                    None
                }
            },
            Err(e) => {
                tracing::warn!(benchmark = %data.benchmark, error = %e, "Configured benchmark is not a valid ticker");
                None
            }
        };

        let assessment = signals::risk_assessment(&series, benchmark.as_ref(), &info)?;
        Ok((assessment, Degraded { fundamentals_missing }))
    }
}

pub fn format_risk_assessment(assessment: &RiskAssessment) -> String {
    let factors = if assessment.factors.is_empty() {
        "None".to_string()
    } else {
        assessment
            .factors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "{} Risk Assessment: Volatility={}, Beta={:.2}, Risk Level={} (Score: {}), Factors: {}",
        assessment.ticker,
        percent(assessment.volatility),
        assessment.beta,
        assessment.risk_level,
        assessment.risk_score,
        factors,
    )
}

fn degraded_note(assessment: &RiskAssessment, degraded: &Degraded) -> Option<String> {
    let mut notes = Vec::new();
    if assessment.beta_source == BetaSource::NeutralDefault {
        notes.push("benchmark unavailable, neutral beta 1.5 used".to_string());
    }
    if !degraded.fundamentals_missing.is_empty() {
        notes.push(format!(
            "defaulted to 0: {}",
            degraded.fundamentals_missing.join(", ")
        ));
    }
    (!notes.is_empty()).then(|| format!(" (Note: {})", notes.join("; ")))
}

#[async_trait]
impl SignalTool for RiskAssessmentTool {
    fn kind(&self) -> ToolKind {
        ToolKind::RiskAssessment
    }

    async fn invoke(&self, input: &str) -> String {
        let ticker = match self.context.resolve_ticker(input) {
            Ok(ticker) => ticker,
            Err(e) => return format!("Validation error: {e}"),
        };
        tracing::info!(tool = self.name(), %ticker, "Invoking tool");

        match self.analyze(&ticker).await {
            Ok((assessment, degraded)) => {
                let mut text = format_risk_assessment(&assessment);
                if let Some(note) = degraded_note(&assessment, &degraded) {
                    text.push_str(&note);
                }
                text
            }
            Err(e) => {
                tracing::warn!(tool = self.name(), %ticker, error = %e, "Risk assessment failed");
                self.kind().describe_failure(&ticker, &e)
            }
        }
    }
}
