//! Presentation adapter: turns reports into terminal text or JSON.

use serde::Serialize;
use tickwise_agents::Credentials;
use tickwise_models::{AnalysisReport, CredentialsConfig};

/// Human-readable report for a terminal or chat message.
pub fn render_text(report: &AnalysisReport) -> String {
    let mut lines = vec![format!("Stock Analysis: {}", report.ticker)];

    match &report.market {
        Some(market) => {
            lines.push(format!("Current Price: ${:.2}", market.price));
            lines.push(format!("Change: {:+.2}%", market.change_percent));
            lines.push(format!("Volume: {}", tickwise_agents::tools::thousands(market.volume)));
        }
        None => lines.push(format!("Market Data: {}", report.market_data)),
    }

    lines.push(format!(
        "Recommendation: {} (Confidence: {})",
        report.recommendation, report.confidence
    ));
    let risk_suffix = if report.risk_level_assessed { "" } else { " (not assessed)" };
    lines.push(format!("Risk Level: {}{risk_suffix}", report.risk_level));

    let tools = if report.tools_invoked.is_empty() {
        "none".to_string()
    } else {
        report.tools_invoked.join(", ")
    };
    lines.push(format!("Tools Used: {tools}"));
    lines.push(String::new());
    lines.push("Analysis:".to_string());
    lines.push(report.reasoning.clone());
    lines.push(String::new());
    lines.push(format!(
        "Powered by {} ({}) | run {} | {} ms | {}",
        report.provider,
        report.model,
        report.run_id,
        report.processing_time_ms,
        report.completed_at.format("%Y-%m-%d %H:%M:%S UTC"),
    ));
    lines.join("\n")
}

/// Compact or pretty JSON for any report shape.
pub fn render_json<T: Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

/// Output of the `status` command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    /// None when neither model credential yields a backend.
    pub provider: Option<String>,
    pub model: Option<String>,
    pub tools: Vec<String>,
    pub credentials: Vec<CredentialStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CredentialStatus {
    pub env: String,
    pub set: bool,
}

/// Which configured credentials are present, never their values.
pub fn credential_status(config: &CredentialsConfig, credentials: &Credentials) -> Vec<CredentialStatus> {
    [
        (&config.anthropic_env, credentials.anthropic.is_some()),
        (&config.openai_env, credentials.openai.is_some()),
        (&config.platform_env, credentials.platform.is_some()),
    ]
    .into_iter()
    .map(|(env, set)| CredentialStatus {
        env: env.clone(),
        set,
    })
    .collect()
}

pub fn render_status(status: &StatusReport) -> String {
    let mut lines = vec![format!(
        "Provider: {}",
        match (&status.provider, &status.model) {
            (Some(provider), Some(model)) => format!("{provider} ({model})"),
            _ => "none available".to_string(),
        }
    )];
    lines.push(format!("Tools: {}", status.tools.join(", ")));
    for credential in &status.credentials {
        let state = if credential.set { "set" } else { "unset" };
        lines.push(format!("{}: {state}", credential.env));
    }
    lines.join("\n")
}
