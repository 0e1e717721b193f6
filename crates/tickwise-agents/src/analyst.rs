use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tickwise_models::{
    validate_query, validate_ticker, AnalysisReport, MarketSnapshot, ReportConfig, RiskLevel,
};
use uuid::Uuid;

use crate::classifier::{assessed_risk_level, classify, truncate_chars};
use crate::error::AgentError;
use crate::orchestrator::Orchestrator;
use crate::prompts::analysis_task;
use crate::tools::MarketDataTool;

/// Caller-facing analysis: ticker plus optional focus in, report out.
pub struct StockAnalyzer {
    orchestrator: Arc<Orchestrator>,
    market: Arc<MarketDataTool>,
    report: ReportConfig,
}

impl StockAnalyzer {
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        market: Arc<MarketDataTool>,
        report: ReportConfig,
    ) -> Self {
        Self {
            orchestrator,
            market,
            report,
        }
    }

    /// Validate input, fetch the market snapshot directly, then let the
    /// model run its tools and classify the answer.
    ///
    /// Invalid input fails before anything is fetched.
    pub async fn analyze(
        &self,
        ticker: &str,
        query: Option<&str>,
    ) -> Result<AnalysisReport, AgentError> {
        let start = Instant::now();
        let ticker = validate_ticker(ticker)?;
        let query = query.map(validate_query).transpose()?;
        let run_id = Uuid::new_v4();
        tracing::info!(%run_id, %ticker, "Starting analysis");

        let (signal, market_data) = self.market.describe(&ticker).await;
        let market = signal.map(|s| MarketSnapshot {
            price: s.price(),
            change_percent: s.change_percent(),
            volume: s.volume(),
        });

        let task = analysis_task(ticker.as_str(), query.as_ref().map(|q| q.as_str()));
        let run = self.orchestrator.run(&task).await?;

        let (recommendation, confidence) = classify(&run.answer);
        let assessed = assessed_risk_level(&run.invocations);
        let selection = self.orchestrator.selection();

        let report = AnalysisReport {
            run_id,
            ticker,
            market,
            market_data,
            recommendation,
            confidence,
            risk_level: assessed.unwrap_or(RiskLevel::Medium),
            risk_level_assessed: assessed.is_some(),
            reasoning: truncate_chars(&run.answer, self.report.reasoning_max_chars),
            provider: selection.kind.to_string(),
            model: selection.model.clone(),
            tools_invoked: run.tools_invoked(),
            completed_at: Utc::now(),
            processing_time_ms: start.elapsed().as_millis() as u64,
        };

        tracing::info!(
            %run_id,
            ticker = %report.ticker,
            recommendation = %report.recommendation,
            confidence = %report.confidence,
            risk = %report.risk_level,
            elapsed_ms = report.processing_time_ms,
            "Analysis complete"
        );
        Ok(report)
    }
}
