//! Tickwise - LLM-orchestrated stock analysis
//!
//! A language model picks among four signal tools (market data, technical,
//! fundamental and risk analysis) computed from Yahoo Finance prices, then
//! its answer is reduced to a BUY/SELL/HOLD recommendation.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use tickwise::agents::{Credentials, StockAnalyzer};
//! use tickwise::models::TickwiseConfig;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = TickwiseConfig::default();
//! let credentials = Credentials::from_env(&config.credentials);
//! let analyzer = tickwise::build_analyzer(&config, &credentials)?;
//! let report = tickwise::analyze(&analyzer, "TSLA", Some("momentum")).await?;
//! println!("{}", tickwise::report::render_text(&report));
//! # Ok(())
//! # }
//! ```

pub use tickwise_agents as agents;
pub use tickwise_market as market;
pub use tickwise_models as models;

pub mod report;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tickwise_agents::tools::MarketDataTool;
use tickwise_agents::{AgentError, Credentials, Orchestrator, StockAnalyzer, ToolContext, ToolRegistry};
use tickwise_market::{RetryPolicy, RetryingFetcher, YahooProvider};
use tickwise_models::{AnalysisReport, TickwiseConfig};

/// Read a TOML config. A missing file yields the defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<TickwiseConfig, anyhow::Error> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::info!(path = %path.display(), "No config file, using defaults");
        return Ok(TickwiseConfig::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Failed to parse config: {}", path.display()))
}

/// Yahoo-backed fetcher and the data settings every tool shares.
pub fn build_tool_context(config: &TickwiseConfig) -> Result<Arc<ToolContext>, anyhow::Error> {
    let provider = YahooProvider::new().context("Failed to build Yahoo client")?;
    let fetcher = RetryingFetcher::new(Arc::new(provider), RetryPolicy::from(&config.data));
    Ok(Arc::new(ToolContext::new(Arc::new(fetcher), config.data.clone())))
}

/// Build an Orchestrator from configuration.
pub fn build_orchestrator(
    config: &TickwiseConfig,
    credentials: &Credentials,
) -> Result<Orchestrator, anyhow::Error> {
    let context = build_tool_context(config)?;
    orchestrator_with(config, credentials, context)
}

fn orchestrator_with(
    config: &TickwiseConfig,
    credentials: &Credentials,
    context: Arc<ToolContext>,
) -> Result<Orchestrator, anyhow::Error> {
    let orchestrator = Orchestrator::builder(config.llm.clone())
        .select_provider(credentials)
        .context("No language model provider available")?
        .register_tools(ToolRegistry::standard(context));
    Ok(orchestrator)
}

/// Orchestrator plus the direct market-data path used for report fields.
pub fn build_analyzer(
    config: &TickwiseConfig,
    credentials: &Credentials,
) -> Result<StockAnalyzer, anyhow::Error> {
    let context = build_tool_context(config)?;
    let orchestrator = orchestrator_with(config, credentials, context.clone())?;
    Ok(StockAnalyzer::new(
        Arc::new(orchestrator),
        Arc::new(MarketDataTool::new(context)),
        config.report.clone(),
    ))
}

/// Analyze one ticker with an optional focus.
pub async fn analyze(
    analyzer: &StockAnalyzer,
    ticker: &str,
    query: Option<&str>,
) -> Result<AnalysisReport, AgentError> {
    analyzer.analyze(ticker, query).await
}
